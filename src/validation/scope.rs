//! Scopes that narrow a validation rule's activation to a state or a
//! transition.

use crate::core::{EventId, StateId};
use crate::record::Record;
use crate::validation::rule::{Predicate, ValidationRegistrar, ValidationRule};
use std::sync::Arc;

/// Binds validation rules to `(state)` or `(event, from-state)`.
///
/// [`decorate`](Self::decorate) rewrites a rule's activation condition to
/// additionally require the record's current state to equal the bound
/// state and — when bound to an event — the record's in-flight event to
/// equal that event, conjoined with whatever condition the caller already
/// supplied. The engine never evaluates the rules; it only augments them
/// and forwards them through [`ValidationRegistrar`].
///
/// Scopes are handed to the callbacks of
/// [`MachineBuilder::state_scoped`](crate::builder::MachineBuilder::state_scoped)
/// and
/// [`EventBuilder::transition_scoped`](crate::builder::EventBuilder::transition_scoped).
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationScope {
    state: StateId,
    event: Option<EventId>,
}

impl ValidationScope {
    /// A scope active whenever a record occupies the state.
    pub fn for_state(state: StateId) -> Self {
        ValidationScope { state, event: None }
    }

    /// A scope active only while the event is firing from the state.
    pub fn for_transition(event: EventId, from: StateId) -> Self {
        ValidationScope {
            state: from,
            event: Some(event),
        }
    }

    /// The bound state.
    pub fn state(&self) -> &StateId {
        &self.state
    }

    /// The bound event, if any.
    pub fn event(&self) -> Option<&EventId> {
        self.event.as_ref()
    }

    /// Rewrite the rule's activation condition to require this scope.
    pub fn decorate<R: Record + 'static>(&self, rule: ValidationRule<R>) -> ValidationRule<R> {
        let state = self.state.clone();
        let event = self.event.clone();
        let original = rule.condition.clone();

        let condition: Predicate<R> = Arc::new(move |record| {
            let Some(current) = record.current_state() else {
                return false;
            };
            if current != state {
                return false;
            }
            if let Some(event) = &event {
                if record.active_event().as_ref() != Some(event) {
                    return false;
                }
            }
            original.as_ref().is_none_or(|c| c(record))
        });

        ValidationRule {
            name: rule.name,
            args: rule.args,
            condition: Some(condition),
        }
    }

    /// Decorate the rule and forward it to the registrar.
    pub fn install<R, T>(&self, registrar: &mut T, rule: ValidationRule<R>)
    where
        R: Record + 'static,
        T: ValidationRegistrar<R> + ?Sized,
    {
        registrar.register(self.decorate(rule));
    }
}
