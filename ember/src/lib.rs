//! Progress reporting for ember build steps.
//!
//! [`Reporter`] is the API build steps call: it hands out [`ActivityTimer`]s,
//! announces successes and reports errors. It forwards every activity
//! transition to an [`ActivityRegistry`], which publishes snapshots for the
//! display surface in `ember-display`.
//!
//! Startup happens in three steps, so no timer exists before the registry
//! does:
//!
//! ```rust
//! use ember::{ActivityArgs, ActivityRegistry, Reporter, ReporterConfig};
//!
//! let registry = ActivityRegistry::new();
//! let reporter = Reporter::new(registry.clone(), ReporterConfig::default());
//! let snapshots = registry.subscribe(); // hand to ember_display::Display
//!
//! let timer = reporter.activity_timer("compile", ActivityArgs::default());
//! timer.start();
//! timer.set_status("linking");
//! let summary = timer.end();
//! assert!(summary.starts_with("compile — "));
//! assert!(summary.ends_with(" s — linking"));
//! # drop(snapshots);
//! ```

pub mod cli;
pub mod config;
pub mod log;
pub mod pipeline;
pub mod policy;
pub mod reporter;
pub mod timer;

/// Strip the indentation shared by every line of a string literal, along with
/// a leading newline.
pub use indoc::indoc as strip_indent;
/// [`strip_indent!`] for format strings.
pub use indoc::formatdoc;

pub use config::ReporterConfig;
pub use ember_activity::{ActivityRegistry, Elapsed, Snapshot};
pub use policy::CommandContext;
pub use reporter::Reporter;
pub use timer::{ActivityArgs, ActivityTimer};
