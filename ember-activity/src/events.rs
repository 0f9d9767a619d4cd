//! Journal of accepted activity transitions.
//!
//! Every mutation the registry accepts is recorded as an [`ActivityEvent`] and
//! emitted to tracing as JSON, so a trace export carries the full lifecycle of
//! each activity alongside the rest of the build's logs.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Tracing target used for the activity journal.
pub const ACTIVITY_TARGET: &str = "ember::activity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActivityEvent {
    /// Activity (re)started
    Start { name: String, timestamp: Timestamp },
    /// Status text replaced
    Status {
        name: String,
        text: String,
        timestamp: Timestamp,
    },
    /// Activity ended with its rendered summary
    End {
        name: String,
        summary: String,
        timestamp: Timestamp,
    },
    /// Freestanding success announcement
    Success { text: String, timestamp: Timestamp },
}

impl ActivityEvent {
    /// Name of the activity this event belongs to, if any.
    pub fn activity_name(&self) -> Option<&str> {
        match self {
            ActivityEvent::Start { name, .. }
            | ActivityEvent::Status { name, .. }
            | ActivityEvent::End { name, .. } => Some(name),
            ActivityEvent::Success { .. } => None,
        }
    }

    pub(crate) fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            tracing::trace!(target: ACTIVITY_TARGET, event = json);
        }
    }
}
