//! Guarded transitions and the perform protocol.

use crate::core::{Guard, StateId};
use crate::engine::machine::MachineDefinition;
use crate::engine::MachineError;
use crate::record::Record;
use chrono::{DateTime, Utc};
use std::fmt;

/// One directed edge of an event: `from` → `to`, with an optional guard.
///
/// Two transitions are equal iff their `(from, to)` pair matches; the guard
/// is not part of identity. Equality exists for table de-duplication and
/// testing, never for runtime dispatch.
pub struct Transition<R> {
    from: StateId,
    to: StateId,
    guard: Option<Guard<R>>,
}

impl<R: Record> Transition<R> {
    pub(crate) fn new(from: StateId, to: StateId, guard: Option<Guard<R>>) -> Self {
        Transition { from, to, guard }
    }

    /// The source state.
    pub fn from(&self) -> &StateId {
        &self.from
    }

    /// The target state.
    pub fn to(&self) -> &StateId {
        &self.to
    }

    /// Whether this transition carries a guard.
    pub fn is_guarded(&self) -> bool {
        self.guard.is_some()
    }

    /// Guard evaluation: the record must satisfy its general validity check,
    /// and the configured guard (if any) must pass. Never mutates the
    /// record; a `false` result is a normal negative, not an error.
    pub fn eligible(&self, record: &R) -> bool {
        record.is_valid() && self.guard.as_ref().is_none_or(|g| g.check(record))
    }

    /// Attempt the transition against the record.
    ///
    /// Returns `Ok(false)` without side effects when the guard rejects.
    /// Otherwise runs the firing protocol: state timestamps for the exiting
    /// state (loopback included), then — unless this is a loopback —
    /// enter(to), commit, entered(to), exit(from), in exactly that order.
    /// Exit runs after the commit so exit actions observe the record
    /// already in its new state.
    pub(crate) fn perform(
        &self,
        machine: &MachineDefinition<R>,
        record: &mut R,
    ) -> Result<bool, MachineError> {
        if !self.eligible(record) {
            tracing::trace!(from = %self.from, to = %self.to, "guard rejected transition");
            return Ok(false);
        }

        let current = match record.current_state() {
            Some(current) => current,
            None => return Ok(false),
        };
        let loopback = current == self.to;

        let next_state = machine
            .state(self.to.as_str())
            .ok_or_else(|| MachineError::InvalidState(self.to.to_string()))?;
        let old_state = machine
            .state(current.as_str())
            .ok_or_else(|| MachineError::InvalidState(current.to_string()))?;

        if machine.record_state_timestamps() {
            write_state_timestamps(record, old_state.id(), Utc::now());
        }

        if !loopback {
            next_state.enter(record)?;
        }

        record.set_current_state(&self.to);

        if !loopback {
            next_state.entered(record)?;
            old_state.exit(record)?;
        }

        tracing::debug!(from = %current, to = %self.to, loopback, "state transition committed");
        Ok(true)
    }
}

impl<R> PartialEq for Transition<R> {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl<R> Clone for Transition<R> {
    fn clone(&self) -> Self {
        Transition {
            from: self.from.clone(),
            to: self.to.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<R> fmt::Debug for Transition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// Timestamp bookkeeping for the state being exited (or re-entered, on
/// loopback). Field names derive from the exiting state's name; the
/// `created` pair is written only once, the `updated` pair on every exit.
/// All four share one clock reading.
pub(crate) fn write_state_timestamps<R: Record>(
    record: &mut R,
    exiting: &StateId,
    at: DateTime<Utc>,
) {
    record.write_timestamp_if_absent(&format!("{exiting}_created_at"), at);
    record.write_timestamp_if_absent(&format!("{exiting}_created_on"), at);
    record.write_timestamp_always(&format!("{exiting}_updated_at"), at);
    record.write_timestamp_always(&format!("{exiting}_updated_on"), at);
}
