//! Immutable point-in-time views of the registry, used to drive rendering.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use strum::Display;

/// Lifecycle phase of an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityPhase {
    #[default]
    NotStarted,
    Running,
    Ended,
}

/// One activity as seen by the display surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityView {
    pub phase: ActivityPhase,
    pub status_text: String,
    /// Monotonic instant the activity's timer was created
    pub started: Instant,
    /// Elapsed time frozen when the activity ended
    pub ended_after: Option<Duration>,
    /// Final rendered string handed over by `end`
    pub summary: Option<String>,
    /// Number of times this name has been started
    pub run: u32,
}

impl ActivityView {
    /// Elapsed time as of `now`. Ended activities report the time they ended with.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.ended_after {
            Some(elapsed) => elapsed,
            None => now.saturating_duration_since(self.started),
        }
    }

    pub fn elapsed_seconds(&self, now: Instant) -> f64 {
        self.elapsed(now).as_secs_f64()
    }

    pub fn is_running(&self) -> bool {
        self.phase == ActivityPhase::Running
    }
}

/// Mapping of activities plus the ordered success log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub messages: Vec<String>,
    pub activities: IndexMap<String, ActivityView>,
}

impl Snapshot {
    /// Activities currently shown in the running panel, in start order.
    pub fn live(&self) -> impl Iterator<Item = (&str, &ActivityView)> {
        self.activities
            .iter()
            .filter(|(_, view)| view.is_running())
            .map(|(name, view)| (name.as_str(), view))
    }

    pub fn ended(&self) -> impl Iterator<Item = (&str, &ActivityView)> {
        self.activities
            .iter()
            .filter(|(_, view)| view.phase == ActivityPhase::Ended)
            .map(|(name, view)| (name.as_str(), view))
    }

    pub fn get(&self, name: &str) -> Option<&ActivityView> {
        self.activities.get(name)
    }

    /// Serializable form with elapsed times resolved against `now`.
    pub fn report(&self, now: Instant) -> SnapshotReport {
        SnapshotReport {
            messages: self.messages.clone(),
            activities: self
                .activities
                .iter()
                .map(|(name, view)| {
                    (
                        name.clone(),
                        ActivityReport {
                            status_text: view.status_text.clone(),
                            elapsed_seconds: view.elapsed_seconds(now),
                            phase: view.phase,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Wire shape of a snapshot: `{ messages, activities: name -> {statusText, elapsedSeconds, phase} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub messages: Vec<String>,
    pub activities: IndexMap<String, ActivityReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub status_text: String,
    pub elapsed_seconds: f64,
    pub phase: ActivityPhase,
}
