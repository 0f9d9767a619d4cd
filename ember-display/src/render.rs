//! Pure rendering from a [`Snapshot`] to the lines of a frame.

use console::style;
use ember_activity::{ActivityView, Elapsed, Snapshot};
use std::time::Instant;

/// Spinner animation frames
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Header printed above the history; omitted when empty
    pub title: String,
    pub spinner_frame: usize,
    pub colors: bool,
    /// Live lines are cut to this many columns
    pub width: Option<usize>,
    /// Most lines the live panel may take; the overflow is summarised on the last line
    pub height: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            spinner_frame: 0,
            colors: false,
            width: None,
            height: None,
        }
    }
}

/// A rendered frame.
///
/// `history` is the static block: once a line has been shown it is never
/// rewritten. `live` is the running-activities panel, redrawn every frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub history: Vec<String>,
    pub live: Vec<String>,
}

impl Frame {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.history.iter().chain(self.live.iter()).map(String::as_str)
    }
}

pub fn render(snapshot: &Snapshot, now: Instant, options: &RenderOptions) -> Frame {
    let mut history = Vec::new();
    if !options.title.is_empty() {
        history.push(title_line(&options.title, options));
    }
    history.extend(
        snapshot
            .messages
            .iter()
            .map(|message| success_line(message, options)),
    );
    history.extend(
        snapshot
            .ended()
            .filter_map(|(_, view)| view.summary.as_deref())
            .map(|summary| success_line(summary, options)),
    );

    Frame {
        history,
        live: live_panel(snapshot, now, options),
    }
}

/// One line per running activity, cut to `options.height` lines.
pub fn live_panel(snapshot: &Snapshot, now: Instant, options: &RenderOptions) -> Vec<String> {
    let running: Vec<_> = snapshot.live().collect();
    let limit = options.height.unwrap_or(usize::MAX).max(1);

    if running.len() <= limit {
        return running
            .into_iter()
            .map(|(name, view)| live_line(name, view, now, options))
            .collect();
    }

    let shown = limit - 1;
    let mut lines: Vec<String> = running[..shown]
        .iter()
        .map(|(name, view)| live_line(name, view, now, options))
        .collect();
    lines.push(format!("… {} more", running.len() - shown));
    lines
}

pub fn title_line(title: &str, options: &RenderOptions) -> String {
    style(title).bold().force_styling(options.colors).to_string()
}

pub fn success_line(text: &str, options: &RenderOptions) -> String {
    format!(
        "{} {}",
        style("success").green().force_styling(options.colors),
        text
    )
}

/// `<spinner> <name> — <elapsed> s[ — <status>]`
pub fn live_line(name: &str, view: &ActivityView, now: Instant, options: &RenderOptions) -> String {
    let frame = SPINNER_FRAMES[options.spinner_frame % SPINNER_FRAMES.len()];
    let elapsed = Elapsed(view.elapsed(now));

    let mut line = format!("{frame} {name} — {elapsed}");
    if !view.status_text.is_empty() {
        line.push_str(" — ");
        line.push_str(&view.status_text);
    }

    if let Some(width) = options.width {
        line = console::truncate_str(&line, width, "…").into_owned();
    }

    if options.colors {
        // Only the spinner glyph is coloured; width was measured on plain text.
        let styled = style(frame).blue().force_styling(true).to_string();
        line = line.replacen(frame, &styled, 1);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_activity::ActivityPhase;
    use std::time::Duration;

    fn running(started: Instant, status: &str) -> ActivityView {
        ActivityView {
            phase: ActivityPhase::Running,
            status_text: status.to_string(),
            started,
            ended_after: None,
            summary: None,
            run: 1,
        }
    }

    #[test]
    fn test_live_line_without_status() {
        let now = Instant::now();
        let view = running(now.checked_sub(Duration::from_millis(1234)).unwrap(), "");

        let line = live_line("compile", &view, now, &RenderOptions::default());
        assert_eq!(line, "⠋ compile — 1.234 s");
    }

    #[test]
    fn test_live_line_advances_spinner() {
        let now = Instant::now();
        let view = running(now, "linking");
        let options = RenderOptions {
            spinner_frame: 11,
            ..Default::default()
        };

        assert_eq!(
            live_line("compile", &view, now, &options),
            "⠙ compile — 0.000 s — linking"
        );
    }

    #[test]
    fn test_live_line_truncates_to_width() {
        let now = Instant::now();
        let view = running(now, "a very long status text that will not fit");
        let options = RenderOptions {
            width: Some(20),
            ..Default::default()
        };

        let line = live_line("compile", &view, now, &options);
        assert!(console::measure_text_width(&line) <= 20);
        assert!(line.ends_with('…'));
    }

    #[test]
    fn test_live_panel_summarises_overflow() {
        let now = Instant::now();
        let mut snapshot = Snapshot::default();
        for name in ["a", "b", "c", "d", "e"] {
            snapshot.activities.insert(name.to_string(), running(now, ""));
        }

        let options = RenderOptions {
            height: Some(3),
            ..Default::default()
        };
        assert_eq!(
            live_panel(&snapshot, now, &options),
            vec!["⠋ a — 0.000 s", "⠋ b — 0.000 s", "… 3 more"]
        );

        let options = RenderOptions {
            height: Some(5),
            ..Default::default()
        };
        assert_eq!(live_panel(&snapshot, now, &options).len(), 5);
    }

    #[test]
    fn test_colors_only_when_enabled() {
        let plain = success_line("done", &RenderOptions::default());
        assert_eq!(plain, "success done");

        let colored = success_line(
            "done",
            &RenderOptions {
                colors: true,
                ..Default::default()
            },
        );
        assert_ne!(colored, plain);
        assert_eq!(console::strip_ansi_codes(&colored), plain);
    }
}
