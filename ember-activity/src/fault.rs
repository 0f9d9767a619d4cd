//! Reporting-subsystem faults.
//!
//! A fault is a transition request the registry refused. Faults never reach the
//! build step that caused them; the registry logs them and keeps them for
//! inspection.

use strum::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FaultKind {
    StatusOnUnknown,
    StatusOnEnded,
    EndOnUnknown,
    EndOnEnded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("cannot set status of activity '{0}': it was never started")]
    StatusOnUnknown(String),
    #[error("cannot set status of activity '{0}': it has already ended")]
    StatusOnEnded(String),
    #[error("cannot end activity '{0}': it was never started")]
    EndOnUnknown(String),
    #[error("cannot end activity '{0}': it has already ended")]
    EndOnEnded(String),
}

impl Fault {
    pub fn kind(&self) -> FaultKind {
        match self {
            Fault::StatusOnUnknown(_) => FaultKind::StatusOnUnknown,
            Fault::StatusOnEnded(_) => FaultKind::StatusOnEnded,
            Fault::EndOnUnknown(_) => FaultKind::EndOnUnknown,
            Fault::EndOnEnded(_) => FaultKind::EndOnEnded,
        }
    }

    /// Name of the activity the refused request targeted.
    pub fn activity(&self) -> &str {
        match self {
            Fault::StatusOnUnknown(name)
            | Fault::StatusOnEnded(name)
            | Fault::EndOnUnknown(name)
            | Fault::EndOnEnded(name) => name,
        }
    }
}
