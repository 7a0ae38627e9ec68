//! The record adapter: the engine's only view of the host record type.
//!
//! The engine never touches storage. Everything it needs from the record —
//! reading and writing the state column, the validity check consulted by
//! every guard, named action dispatch, the active-event marker, and the
//! state-timestamp hooks — goes through this trait.

use crate::core::{ActionError, EventId, StateId};
use chrono::{DateTime, Utc};

/// Contract a record type satisfies to host a machine definition.
///
/// `current_state`, `set_current_state`, and `is_valid` are the required
/// core. The remaining methods have conservative defaults so a record only
/// implements what its definition actually uses: named actions, named
/// guards, event-scoped validation, or state timestamps.
///
/// # Example
///
/// ```rust
/// use statebound::{Record, StateId};
///
/// struct Order {
///     status: Option<String>,
/// }
///
/// impl Record for Order {
///     fn current_state(&self) -> Option<StateId> {
///         self.status.as_deref().map(StateId::new)
///     }
///
///     fn set_current_state(&mut self, state: &StateId) {
///         self.status = Some(state.as_str().to_string());
///     }
///
///     fn is_valid(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait Record {
    /// Read the current state from the state column, if set.
    ///
    /// `None` only before initialization.
    fn current_state(&self) -> Option<StateId>;

    /// Write the state column. The engine calls this from exactly one
    /// place: the commit step of a performed transition (and from
    /// [`MachineDefinition::initialize_record`]).
    ///
    /// [`MachineDefinition::initialize_record`]: crate::engine::MachineDefinition::initialize_record
    fn set_current_state(&mut self, state: &StateId);

    /// Restore the state column to the value it held before a firing began.
    ///
    /// Invoked only when an event fires no transition, so that a failed
    /// firing leaves the observable state unchanged even if surrounding
    /// framework code tentatively altered the column. Records with dirty
    /// tracking can override this to discard the pending change instead.
    fn rollback_state(&mut self, previous: Option<&StateId>) {
        if let Some(previous) = previous {
            self.set_current_state(previous);
        }
    }

    /// Record-level validity, conjoined into every guard evaluation.
    fn is_valid(&self) -> bool;

    /// Dispatch a named lifecycle action. Override when the definition uses
    /// [`Action::method`](crate::core::Action::method).
    fn run_named_action(&mut self, name: &str) -> Result<(), ActionError> {
        Err(format!("record has no action named '{name}'").into())
    }

    /// Dispatch a named guard predicate. Override when the definition uses
    /// [`Guard::method`](crate::core::Guard::method).
    fn eval_named_guard(&self, _name: &str) -> bool {
        false
    }

    /// The event currently being fired against this record, if any.
    ///
    /// Read by event-scoped validation rules; `None` outside a firing call.
    fn active_event(&self) -> Option<EventId> {
        None
    }

    /// Mark or clear the in-flight event. Set before dispatch and cleared
    /// on every exit path of a firing call.
    fn set_active_event(&mut self, _event: Option<EventId>) {}

    /// Write `at` into the named timestamp field only if the field exists
    /// and is currently unset. Records without the field ignore the call.
    fn write_timestamp_if_absent(&mut self, _field: &str, _at: DateTime<Utc>) {}

    /// Write `at` into the named timestamp field whenever the field exists,
    /// overwriting any prior value. Records without the field ignore the
    /// call.
    fn write_timestamp_always(&mut self, _field: &str, _at: DateTime<Utc>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinimalRecord {
        state: Option<StateId>,
    }

    impl Record for MinimalRecord {
        fn current_state(&self) -> Option<StateId> {
            self.state.clone()
        }

        fn set_current_state(&mut self, state: &StateId) {
            self.state = Some(state.clone());
        }

        fn is_valid(&self) -> bool {
            true
        }
    }

    #[test]
    fn default_rollback_restores_the_previous_value() {
        let mut record = MinimalRecord {
            state: Some(StateId::new("closed")),
        };

        record.rollback_state(Some(&StateId::new("open")));
        assert_eq!(record.current_state(), Some(StateId::new("open")));
    }

    #[test]
    fn default_rollback_with_no_previous_value_is_a_no_op() {
        let mut record = MinimalRecord {
            state: Some(StateId::new("open")),
        };

        record.rollback_state(None);
        assert_eq!(record.current_state(), Some(StateId::new("open")));
    }

    #[test]
    fn default_named_action_reports_the_missing_name() {
        let mut record = MinimalRecord { state: None };

        let err = record.run_named_action("archive").unwrap_err();
        assert!(err.to_string().contains("archive"));
    }

    #[test]
    fn default_named_guard_rejects() {
        let record = MinimalRecord { state: None };
        assert!(!record.eval_named_guard("anything"));
    }

    #[test]
    fn default_event_marker_is_absent() {
        let mut record = MinimalRecord { state: None };
        assert_eq!(record.active_event(), None);

        // Defaults discard the marker; records opting into event-scoped
        // validation store it instead.
        record.set_active_event(Some(EventId::new("close")));
        assert_eq!(record.active_event(), None);
    }
}
