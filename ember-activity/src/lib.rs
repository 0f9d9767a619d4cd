//! Activity tracking for ember build steps.
//!
//! This crate owns the state behind the progress display:
//! - [`ActivityRegistry`] holds every activity and the success log and is the
//!   only place either is mutated
//! - [`Snapshot`]s are immutable copies of that state, published on every
//!   mutation for the display surface to redraw from
//! - [`ActivityEvent`]s journal each accepted transition to tracing
//!
//! ## Usage
//!
//! ```rust
//! use ember_activity::{ActivityPhase, ActivityRegistry};
//!
//! let registry = ActivityRegistry::new();
//! let mut snapshots = registry.subscribe();
//!
//! registry.start("compile");
//! registry.set_status("compile", "linking").unwrap();
//! registry.end("compile", "compile — 0.010 s — linking").unwrap();
//! registry.log_success("compiled 3 modules");
//!
//! let snapshot = snapshots.borrow_and_update().clone();
//! assert_eq!(snapshot.get("compile").unwrap().phase, ActivityPhase::Ended);
//! assert_eq!(snapshot.messages, vec!["compiled 3 modules"]);
//! ```

mod elapsed;
mod events;
mod fault;
mod registry;
mod snapshot;
mod timestamp;

pub use elapsed::Elapsed;
pub use events::{ACTIVITY_TARGET, ActivityEvent};
pub use fault::{Fault, FaultKind};
pub use registry::ActivityRegistry;
pub use snapshot::{ActivityPhase, ActivityReport, ActivityView, Snapshot, SnapshotReport};
pub use timestamp::Timestamp;
