//! Builder for declaring events and their ordered transitions.

use crate::builder::error::DefinitionError;
use crate::builder::transition::TransitionBuilder;
use crate::core::EventId;
use crate::engine::Event;
use crate::record::Record;
use crate::validation::ValidationScope;

/// Declares one event: a named, ordered group of transitions.
///
/// Declaration order is the dispatch order — when several transitions share
/// a source state, the one declared first wins at firing time.
///
/// # Example
///
/// ```rust
/// use statebound::{EventBuilder, TransitionBuilder};
/// # use statebound::{Record, StateId};
/// # struct Ticket { state: Option<StateId> }
/// # impl Record for Ticket {
/// #     fn current_state(&self) -> Option<StateId> { self.state.clone() }
/// #     fn set_current_state(&mut self, s: &StateId) { self.state = Some(s.clone()); }
/// #     fn is_valid(&self) -> bool { true }
/// # }
///
/// let close: EventBuilder<Ticket> = EventBuilder::new("close")
///     .transition(TransitionBuilder::new().from("open").to("closed"));
/// ```
pub struct EventBuilder<R> {
    name: EventId,
    transitions: Vec<TransitionBuilder<R>>,
}

impl<R: Record> EventBuilder<R> {
    /// Start declaring the named event.
    pub fn new(name: impl Into<EventId>) -> Self {
        EventBuilder {
            name: name.into(),
            transitions: Vec::new(),
        }
    }

    /// Append a transition declaration. Order is significant.
    pub fn transition(mut self, transition: TransitionBuilder<R>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Append a transition declaration and invoke the scoping callback once
    /// per source state, bound to `(this event, that source)`.
    ///
    /// The callback typically installs validation rules whose activation
    /// the scope has been narrowed to this transition; see
    /// [`ValidationScope`].
    pub fn transition_scoped<F>(mut self, transition: TransitionBuilder<R>, mut scope: F) -> Self
    where
        F: FnMut(&ValidationScope),
    {
        for from in transition.froms() {
            scope(&ValidationScope::for_transition(
                self.name.clone(),
                from.clone(),
            ));
        }
        self.transitions.push(transition);
        self
    }

    pub(crate) fn name(&self) -> &EventId {
        &self.name
    }

    pub(crate) fn build(self) -> Result<Event<R>, DefinitionError> {
        let mut transitions = Vec::new();
        for builder in self.transitions {
            transitions.extend(builder.build(&self.name)?);
        }
        Ok(Event::new(self.name, transitions))
    }
}
