//! Activity timers handed out by the reporter.

use ember_activity::{ACTIVITY_TARGET, ActivityRegistry, Elapsed};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::Span;

/// Options for [`Reporter::activity_timer`](crate::Reporter::activity_timer).
#[derive(Debug, Clone, Default)]
pub struct ActivityArgs {
    /// Span the activity's span is created under; a root span is used when unset
    pub parent_span: Option<Span>,
}

impl ActivityArgs {
    pub fn child_of(parent: &Span) -> Self {
        Self {
            parent_span: Some(parent.clone()),
        }
    }
}

/// Handle for one timed activity.
///
/// The clock starts when the timer is created, not when [`start`](Self::start)
/// is called. The timer forwards every transition to the registry it was
/// created with and never holds registry state itself.
#[must_use = "an activity is not shown until the timer is started"]
pub struct ActivityTimer {
    name: String,
    started: Instant,
    status: Mutex<Option<String>>,
    span: Span,
    registry: Arc<ActivityRegistry>,
}

impl ActivityTimer {
    pub(crate) fn new(
        name: String,
        args: ActivityArgs,
        registry: Arc<ActivityRegistry>,
    ) -> Self {
        let started = Instant::now();
        let parent = args.parent_span.as_ref().and_then(Span::id);
        let span = tracing::info_span!(target: ACTIVITY_TARGET, parent: parent, "activity", name = %name);

        Self {
            name,
            started,
            status: Mutex::new(None),
            span,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Show the activity as running.
    pub fn start(&self) {
        self.registry.start_at(self.name.clone(), self.started);
    }

    /// Replace the status text. The last status set is appended to the final summary.
    pub fn set_status(&self, text: impl Into<String>) {
        let text = text.into();
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.clone());
        // Refusals are recorded by the registry.
        let _ = self.registry.set_status(&self.name, text);
    }

    /// Finish the span and end the activity, returning the summary it ended with.
    ///
    /// The summary reads `<name> — <seconds> s`, followed by ` — <status>` when a
    /// non-empty status was set.
    pub fn end(self) -> String {
        let ended = Instant::now();
        let elapsed = Elapsed(ended.saturating_duration_since(self.started));

        let Self {
            name,
            status,
            span,
            registry,
            ..
        } = self;

        span.in_scope(|| {
            tracing::debug!(target: ACTIVITY_TARGET, elapsed = %elapsed, "activity finished");
        });
        drop(span);

        let status = status.into_inner().unwrap_or_else(PoisonError::into_inner);
        let summary = compose_summary(&name, elapsed, status.as_deref());
        let _ = registry.end_at(&name, summary.clone(), ended);
        summary
    }

    /// The activity's tracing span, for use as a parent or with `.instrument()`.
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn elapsed(&self) -> Elapsed {
        Elapsed(self.started.elapsed())
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn started(&self) -> Instant {
        self.started
    }
}

impl std::fmt::Debug for ActivityTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityTimer")
            .field("name", &self.name)
            .field("elapsed", &self.elapsed())
            .finish_non_exhaustive()
    }
}

fn compose_summary(name: &str, elapsed: Elapsed, status: Option<&str>) -> String {
    match status {
        Some(status) if !status.is_empty() => format!("{name} — {elapsed} — {status}"),
        _ => format!("{name} — {elapsed}"),
    }
}
