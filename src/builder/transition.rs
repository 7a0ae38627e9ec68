//! Builder for declaring guarded transitions.

use crate::builder::error::DefinitionError;
use crate::core::{EventId, Guard, StateId};
use crate::engine::Transition;
use crate::record::Record;

/// Declares one edge (or a fan of edges) of an event.
///
/// `from` may be given several times — or all at once with
/// [`from_any`](Self::from_any) — and the declaration expands to one
/// transition per source state, all sharing the target and guard.
///
/// # Example
///
/// ```rust
/// use statebound::{Guard, TransitionBuilder};
/// # use statebound::{Record, StateId};
/// # struct Ticket { state: Option<StateId> }
/// # impl Record for Ticket {
/// #     fn current_state(&self) -> Option<StateId> { self.state.clone() }
/// #     fn set_current_state(&mut self, s: &StateId) { self.state = Some(s.clone()); }
/// #     fn is_valid(&self) -> bool { true }
/// # }
///
/// let archive: TransitionBuilder<Ticket> = TransitionBuilder::new()
///     .from_any(["open", "closed"])
///     .to("archived")
///     .guard(Guard::method("archivable"));
/// ```
pub struct TransitionBuilder<R> {
    froms: Vec<StateId>,
    to: Option<StateId>,
    guard: Option<Guard<R>>,
}

impl<R: Record> TransitionBuilder<R> {
    /// Start declaring a transition.
    pub fn new() -> Self {
        TransitionBuilder {
            froms: Vec::new(),
            to: None,
            guard: None,
        }
    }

    /// Add a source state (required, at least once).
    pub fn from(mut self, state: impl Into<StateId>) -> Self {
        self.froms.push(state.into());
        self
    }

    /// Add a set of source states; expands to one transition per state.
    pub fn from_any<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateId>,
    {
        self.froms.extend(states.into_iter().map(Into::into));
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<StateId>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Attach a guard (optional).
    pub fn guard(mut self, guard: Guard<R>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach a guard from a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub(crate) fn froms(&self) -> &[StateId] {
        &self.froms
    }

    /// Expand into one transition per source state.
    pub(crate) fn build(self, event: &EventId) -> Result<Vec<Transition<R>>, DefinitionError> {
        if self.froms.is_empty() {
            return Err(DefinitionError::MissingFromState {
                event: event.to_string(),
            });
        }
        let to = self.to.ok_or_else(|| DefinitionError::MissingToState {
            event: event.to_string(),
        })?;

        Ok(self
            .froms
            .into_iter()
            .map(|from| Transition::new(from, to.clone(), self.guard.clone()))
            .collect())
    }
}

impl<R: Record> Default for TransitionBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
