//! Builder for declaring a complete machine definition.

use crate::builder::error::DefinitionError;
use crate::builder::event::EventBuilder;
use crate::builder::state::StateBuilder;
use crate::core::{EventId, State, StateId};
use crate::engine::{Event, MachineDefinition};
use crate::record::Record;
use crate::validation::ValidationScope;
use std::collections::HashMap;

/// Declares a machine definition: options, states, and events.
///
/// `initial` is required; `column` defaults to `"state"`;
/// `record_state_timestamps` defaults to `true`. `build()` validates the
/// whole declaration eagerly — undeclared state references, duplicate
/// names, and a missing or undeclared initial state are all definition-time
/// errors — and the resulting [`MachineDefinition`] is immutable.
///
/// # Example
///
/// ```rust
/// use statebound::{EventBuilder, MachineBuilder, StateBuilder, TransitionBuilder};
/// # use statebound::{Record, StateId};
/// # struct Ticket { state: Option<StateId> }
/// # impl Record for Ticket {
/// #     fn current_state(&self) -> Option<StateId> { self.state.clone() }
/// #     fn set_current_state(&mut self, s: &StateId) { self.state = Some(s.clone()); }
/// #     fn is_valid(&self) -> bool { true }
/// # }
///
/// let machine = MachineBuilder::<Ticket>::new()
///     .initial("open")
///     .states(["open", "closed"])
///     .event(EventBuilder::new("close")
///         .transition(TransitionBuilder::new().from("open").to("closed")))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.initial_state().as_str(), "open");
/// ```
pub struct MachineBuilder<R> {
    initial: Option<StateId>,
    column: String,
    record_state_timestamps: bool,
    states: Vec<StateBuilder<R>>,
    events: Vec<EventBuilder<R>>,
}

impl<R: Record> MachineBuilder<R> {
    /// Start a declaration with default options.
    pub fn new() -> Self {
        MachineBuilder {
            initial: None,
            column: "state".to_string(),
            record_state_timestamps: true,
            states: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The state newly created records start in (required).
    pub fn initial(mut self, state: impl Into<StateId>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// The record field holding the current state (default `"state"`).
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Whether performed transitions write state timestamps (default
    /// `true`).
    pub fn record_state_timestamps(mut self, enabled: bool) -> Self {
        self.record_state_timestamps = enabled;
        self
    }

    /// Declare a state.
    pub fn state(mut self, state: StateBuilder<R>) -> Self {
        self.states.push(state);
        self
    }

    /// Declare several action-less states at once.
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StateId>,
    {
        for name in names {
            self.states.push(StateBuilder::new(name));
        }
        self
    }

    /// Declare a state and invoke the scoping callback bound to it, for
    /// installing validation rules active only while a record occupies the
    /// state. See [`ValidationScope`].
    pub fn state_scoped<F>(mut self, state: StateBuilder<R>, scope: F) -> Self
    where
        F: FnOnce(&ValidationScope),
    {
        scope(&ValidationScope::for_state(state.id().clone()));
        self.states.push(state);
        self
    }

    /// Declare an event.
    pub fn event(mut self, event: EventBuilder<R>) -> Self {
        self.events.push(event);
        self
    }

    /// Compile the declaration into an immutable [`MachineDefinition`].
    pub fn build(self) -> Result<MachineDefinition<R>, DefinitionError> {
        let initial = self.initial.ok_or(DefinitionError::NoInitialState)?;

        let mut states: HashMap<StateId, State<R>> = HashMap::new();
        for builder in self.states {
            let id = builder.id().clone();
            if states.contains_key(&id) {
                return Err(DefinitionError::DuplicateState(id.to_string()));
            }
            states.insert(id, builder.build());
        }

        if !states.contains_key(&initial) {
            return Err(DefinitionError::NoInitialState);
        }

        let mut events: HashMap<EventId, Event<R>> = HashMap::new();
        for builder in self.events {
            let name = builder.name().clone();
            if events.contains_key(&name) {
                return Err(DefinitionError::DuplicateEvent(name.to_string()));
            }
            let event = builder.build()?;
            for transition in event.transitions() {
                for state in [transition.from(), transition.to()] {
                    if !states.contains_key(state) {
                        return Err(DefinitionError::UndeclaredState {
                            event: name.to_string(),
                            state: state.to_string(),
                        });
                    }
                }
            }
            events.insert(name, event);
        }

        Ok(MachineDefinition::new(
            states,
            initial,
            events,
            self.column,
            self.record_state_timestamps,
        ))
    }
}

impl<R: Record> Default for MachineBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
