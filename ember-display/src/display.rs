//! Inline terminal display driven by registry snapshots.

use crossterm::{cursor, queue, terminal};
use ember_activity::Snapshot;
use std::collections::HashSet;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::render::{self, RenderOptions, SPINNER_FRAMES};

/// How the display writes to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// History lines plus a live panel that is cleared and redrawn in place
    Interactive,
    /// History lines only, suitable for pipes and CI logs
    Plain,
}

impl DisplayMode {
    pub fn detect() -> Self {
        if io::stdout().is_terminal() {
            DisplayMode::Interactive
        } else {
            DisplayMode::Plain
        }
    }
}

/// Configuration for the display.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Maximum frames per second for redrawing the live panel
    pub max_fps: u64,
    /// Static header printed once before any history
    pub title: String,
    pub mode: DisplayMode,
    pub colors: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_fps: 30,
            title: "Building".to_string(),
            mode: DisplayMode::detect(),
            colors: console::colors_enabled(),
        }
    }
}

/// Display surface: a consumer of snapshots that redraws on every change.
///
/// The terminal state lives behind a lock shared with every [`DisplayHandle`],
/// so output written through a handle and the final flush before a process
/// exit never interleave with a redraw.
pub struct Display {
    screen: Arc<Mutex<Screen>>,
    changes: watch::Receiver<Arc<Snapshot>>,
}

struct Screen {
    config: DisplayConfig,
    snapshots: watch::Receiver<Arc<Snapshot>>,
    out: Box<dyn Write + Send>,
    printed: Printed,
    spinner_frame: usize,
    /// Lines occupied by the live panel drawn last
    live_lines: u16,
    /// Set by the last draw; nothing is written to `out` afterwards
    finished: bool,
}

/// History already written to the terminal.
#[derive(Debug, Default)]
struct Printed {
    title: bool,
    messages: usize,
    /// (activity name, run) pairs whose summary has been printed
    ended: HashSet<(String, u32)>,
}

fn lock(screen: &Mutex<Screen>) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(PoisonError::into_inner)
}

fn frame_period(max_fps: u64) -> Duration {
    Duration::from_secs_f64(1.0 / max_fps.max(1) as f64).max(Duration::from_millis(1))
}

impl Display {
    pub fn new(snapshots: watch::Receiver<Arc<Snapshot>>) -> Self {
        let screen = Screen {
            config: DisplayConfig::default(),
            snapshots: snapshots.clone(),
            out: Box::new(io::stdout()),
            printed: Printed::default(),
            spinner_frame: 0,
            live_lines: 0,
            finished: false,
        };
        Self {
            screen: Arc::new(Mutex::new(screen)),
            changes: snapshots,
        }
    }

    pub fn config(self, config: DisplayConfig) -> Self {
        lock(&self.screen).config = config;
        self
    }

    /// Set the static header.
    pub fn title(self, title: impl Into<String>) -> Self {
        lock(&self.screen).config.title = title.into();
        self
    }

    pub fn mode(self, mode: DisplayMode) -> Self {
        lock(&self.screen).config.mode = mode;
        self
    }

    pub fn colors(self, colors: bool) -> Self {
        lock(&self.screen).config.colors = colors;
        self
    }

    pub fn max_fps(self, max_fps: u64) -> Self {
        lock(&self.screen).config.max_fps = max_fps;
        self
    }

    /// Write to `out` instead of stdout.
    pub fn writer(self, out: impl Write + Send + 'static) -> Self {
        lock(&self.screen).out = Box::new(out);
        self
    }

    /// A handle for writing other output around the live panel.
    pub fn handle(&self) -> DisplayHandle {
        DisplayHandle {
            screen: self.screen.clone(),
        }
    }

    /// Run until `done` fires or the registry is dropped.
    ///
    /// Changes are coalesced and drawn at most `max_fps` times a second. Before
    /// returning, the latest snapshot is drawn so no mutation is left unshown,
    /// and the live panel is removed.
    pub async fn run(mut self, mut done: oneshot::Receiver<()>) -> io::Result<()> {
        let (max_fps, mode) = {
            let screen = lock(&self.screen);
            (screen.config.max_fps, screen.config.mode)
        };
        let mut ticker = tokio::time::interval(frame_period(max_fps));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut dirty = true;
        loop {
            tokio::select! {
                changed = self.changes.changed() => {
                    if changed.is_err() {
                        debug!("snapshot channel closed");
                        break;
                    }
                    dirty = true;
                }

                _ = ticker.tick() => {
                    let mut screen = lock(&self.screen);
                    screen.spinner_frame = (screen.spinner_frame + 1) % SPINNER_FRAMES.len();
                    if dirty || mode == DisplayMode::Interactive {
                        screen.draw(false)?;
                        dirty = false;
                    }
                }

                _ = &mut done => break,
            }
        }

        self.handle().finish()
    }
}

impl Screen {
    fn render_options(&self) -> RenderOptions {
        let size = match self.config.mode {
            DisplayMode::Interactive => terminal::size().ok(),
            DisplayMode::Plain => None,
        };
        RenderOptions {
            title: self.config.title.clone(),
            spinner_frame: self.spinner_frame,
            colors: self.config.colors,
            width: size.map(|(w, _)| w as usize),
            // One row stays free for the cursor.
            height: size.map(|(_, h)| h.saturating_sub(1) as usize),
        }
    }

    fn clear_panel(&mut self) -> io::Result<()> {
        if self.live_lines > 0 {
            queue!(
                self.out,
                cursor::MoveToPreviousLine(self.live_lines),
                terminal::Clear(terminal::ClearType::FromCursorDown)
            )?;
            self.live_lines = 0;
        }
        self.out.flush()
    }

    /// Draw the latest snapshot: new history lines, then the live panel unless `last`.
    fn draw(&mut self, last: bool) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        let snapshot = self.snapshots.borrow().clone();
        let options = self.render_options();

        self.clear_panel()?;

        for line in self.unprinted_history(&snapshot, &options) {
            writeln!(self.out, "{line}")?;
        }

        if last {
            self.finished = true;
        } else if self.config.mode == DisplayMode::Interactive {
            for line in render::live_panel(&snapshot, Instant::now(), &options) {
                writeln!(self.out, "{line}")?;
                self.live_lines = self.live_lines.saturating_add(1);
            }
        }

        self.out.flush()
    }

    fn unprinted_history(&mut self, snapshot: &Snapshot, options: &RenderOptions) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.printed.title && !options.title.is_empty() {
            lines.push(render::title_line(&options.title, options));
            self.printed.title = true;
        }

        for message in snapshot.messages.iter().skip(self.printed.messages) {
            lines.push(render::success_line(message, options));
        }
        self.printed.messages = snapshot.messages.len();

        for (name, view) in snapshot.ended() {
            let Some(summary) = view.summary.as_deref() else {
                continue;
            };
            if self.printed.ended.insert((name.to_string(), view.run)) {
                lines.push(render::success_line(summary, options));
            }
        }

        lines
    }
}

/// Shared access to a [`Display`]'s terminal from outside its render loop.
///
/// Nothing that writes through a handle may log through `tracing` while
/// doing so, as log output is itself routed through a handle.
#[derive(Clone)]
pub struct DisplayHandle {
    screen: Arc<Mutex<Screen>>,
}

impl DisplayHandle {
    /// Write `text` to `target` above the live panel.
    ///
    /// The panel is cleared first and redrawn after `text`, so output sharing
    /// the terminal with the display is never drawn over.
    pub fn print_above(&self, target: &mut dyn Write, text: &[u8]) -> io::Result<()> {
        let mut screen = lock(&self.screen);
        if screen.finished {
            target.write_all(text)?;
            return target.flush();
        }

        screen.clear_panel()?;
        target.write_all(text)?;
        target.flush()?;
        screen.draw(false)
    }

    /// Draw every pending history line and remove the live panel.
    ///
    /// Safe to call before the process exits while the render loop is still
    /// running; the loop draws nothing afterwards.
    pub fn finish(&self) -> io::Result<()> {
        lock(&self.screen).draw(true)
    }

    /// A writer whose output is printed above the live panel on each flush.
    pub fn writer_above<W: Write>(&self, target: W) -> DisplayWriter<W> {
        DisplayWriter {
            handle: self.clone(),
            target,
            buffer: Vec::new(),
        }
    }
}

impl std::fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayHandle").finish_non_exhaustive()
    }
}

/// Buffers writes and hands them to [`DisplayHandle::print_above`] on flush
/// or drop.
pub struct DisplayWriter<W: Write> {
    handle: DisplayHandle,
    target: W,
    buffer: Vec<u8>,
}

impl<W: Write> Write for DisplayWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.buffer);
        self.handle.print_above(&mut self.target, &text)
    }
}

impl<W: Write> Drop for DisplayWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
