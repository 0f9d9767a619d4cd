//! The activity registry: sole owner of activity state and the message log.

use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::events::{ACTIVITY_TARGET, ActivityEvent};
use crate::fault::Fault;
use crate::snapshot::{ActivityPhase, ActivityView, Snapshot};
use crate::Timestamp;

#[derive(Debug, Default)]
struct RegistryState {
    activities: IndexMap<String, ActivityView>,
    messages: Vec<String>,
    faults: Vec<Fault>,
}

impl RegistryState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.messages.clone(),
            activities: self.activities.clone(),
        }
    }
}

/// Owns the live-activity map and the message log.
///
/// All mutations go through the registry and happen in call order under a
/// single lock. After every accepted mutation a new [`Snapshot`] is published
/// on a `watch` channel, so a subscriber always observes a state that includes
/// every prior mutation. Requests the registry refuses are returned as
/// [`Fault`]s, logged, and kept for inspection; they never modify state.
#[derive(Debug)]
pub struct ActivityRegistry {
    state: Mutex<RegistryState>,
    snapshots: watch::Sender<Arc<Snapshot>>,
}

impl ActivityRegistry {
    pub fn new() -> Arc<Self> {
        let (snapshots, _) = watch::channel(Arc::new(Snapshot::default()));
        Arc::new(Self {
            state: Mutex::new(RegistryState::default()),
            snapshots,
        })
    }

    /// Start `name`, timing it from now.
    pub fn start(&self, name: impl Into<String>) {
        self.start_at(name, Instant::now());
    }

    /// Start `name`, timing it from `started`.
    ///
    /// Starting a name that is already known (running or ended) resets it: the
    /// status text is cleared and the run counter increases.
    pub fn start_at(&self, name: impl Into<String>, started: Instant) {
        let name = name.into();
        let mut state = self.lock();

        let run = match state.activities.shift_remove(&name) {
            Some(previous) => {
                debug!(activity = %name, phase = %previous.phase, "restarting activity");
                previous.run.saturating_add(1)
            }
            None => 1,
        };

        state.activities.insert(
            name.clone(),
            ActivityView {
                phase: ActivityPhase::Running,
                status_text: String::new(),
                started,
                ended_after: None,
                summary: None,
                run,
            },
        );

        self.commit(
            &state,
            ActivityEvent::Start {
                name,
                timestamp: Timestamp::now(),
            },
        );
    }

    /// Replace the status text of a running activity.
    pub fn set_status(&self, name: &str, text: impl Into<String>) -> Result<(), Fault> {
        let text = text.into();
        let mut state = self.lock();

        match state.activities.get(name).map(|view| view.phase) {
            Some(ActivityPhase::Running) => {}
            Some(_) => return Self::refuse(&mut state, Fault::StatusOnEnded(name.to_string())),
            None => return Self::refuse(&mut state, Fault::StatusOnUnknown(name.to_string())),
        }
        if let Some(view) = state.activities.get_mut(name) {
            view.status_text.clone_from(&text);
        }

        self.commit(
            &state,
            ActivityEvent::Status {
                name: name.to_string(),
                text,
                timestamp: Timestamp::now(),
            },
        );
        Ok(())
    }

    /// End a running activity now.
    pub fn end(&self, name: &str, summary: impl Into<String>) -> Result<(), Fault> {
        self.end_at(name, summary, Instant::now())
    }

    /// End a running activity, freezing its elapsed time at `ended`.
    ///
    /// The entry stays in the snapshot marked [`ActivityPhase::Ended`] so its
    /// final status and summary remain readable; it no longer appears in
    /// [`Snapshot::live`].
    pub fn end_at(
        &self,
        name: &str,
        summary: impl Into<String>,
        ended: Instant,
    ) -> Result<(), Fault> {
        let summary = summary.into();
        let mut state = self.lock();

        match state.activities.get(name).map(|view| view.phase) {
            Some(ActivityPhase::Running) => {}
            Some(_) => return Self::refuse(&mut state, Fault::EndOnEnded(name.to_string())),
            None => return Self::refuse(&mut state, Fault::EndOnUnknown(name.to_string())),
        }
        if let Some(view) = state.activities.get_mut(name) {
            view.phase = ActivityPhase::Ended;
            view.ended_after = Some(ended.saturating_duration_since(view.started));
            view.summary = Some(summary.clone());
        }

        self.commit(
            &state,
            ActivityEvent::End {
                name: name.to_string(),
                summary,
                timestamp: Timestamp::now(),
            },
        );
        Ok(())
    }

    /// Append a success message to the log. Duplicates are kept as separate entries.
    pub fn log_success(&self, message: impl Into<String>) {
        let text = message.into();
        let mut state = self.lock();
        state.messages.push(text.clone());

        self.commit(
            &state,
            ActivityEvent::Success {
                text,
                timestamp: Timestamp::now(),
            },
        );
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.subscribe()
    }

    /// Every request refused so far, oldest first.
    pub fn faults(&self) -> Vec<Fault> {
        self.lock().faults.clone()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refuse(state: &mut RegistryState, fault: Fault) -> Result<(), Fault> {
        warn!(target: ACTIVITY_TARGET, kind = %fault.kind(), "{fault}");
        state.faults.push(fault.clone());
        Err(fault)
    }

    // Publishing under the lock keeps snapshot order identical to mutation order.
    fn commit(&self, state: &RegistryState, event: ActivityEvent) {
        event.emit();
        self.snapshots.send_replace(Arc::new(state.snapshot()));
    }
}
