//! Runtime error taxonomy.

use crate::core::ActionError;
use thiserror::Error;

/// Errors surfaced by runtime dispatch and queries.
///
/// Guard rejection and firing with no eligible transition are *not* errors —
/// they are the normal `Ok(false)` outcome of a firing call.
#[derive(Debug, Error)]
pub enum MachineError {
    /// A query or predicate referenced a state name the machine never
    /// declared.
    #[error("state '{0}' is not declared on this machine")]
    InvalidState(String),

    /// Dispatch referenced an event name the machine never declared.
    #[error("event '{0}' is not declared on this machine")]
    UnknownEvent(String),

    /// A lifecycle action failed. The underlying failure propagates
    /// unmodified; the in-progress firing is aborted where it stood.
    #[error("lifecycle action failed: {0}")]
    Action(#[from] ActionError),
}
