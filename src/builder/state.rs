//! Builder for declaring a state and its lifecycle actions.

use crate::core::{Action, State, StateId};
use crate::record::Record;

/// Declares one state of the machine.
///
/// A state with no actions is just a name; the enter, after-entry, and exit
/// hooks are optional. After-entry actions accumulate and run in the order
/// they were added.
///
/// # Example
///
/// ```rust
/// use statebound::{Action, StateBuilder};
/// # use statebound::{Record, StateId};
/// # struct Ticket { state: Option<StateId> }
/// # impl Record for Ticket {
/// #     fn current_state(&self) -> Option<StateId> { self.state.clone() }
/// #     fn set_current_state(&mut self, s: &StateId) { self.state = Some(s.clone()); }
/// #     fn is_valid(&self) -> bool { true }
/// # }
///
/// let closed: StateBuilder<Ticket> = StateBuilder::new("closed")
///     .on_enter(Action::method("seal"))
///     .on_entered(Action::method("notify_owner"))
///     .on_exit(Action::method("log_reopen"));
/// ```
pub struct StateBuilder<R> {
    id: StateId,
    on_enter: Option<Action<R>>,
    on_entered: Vec<Action<R>>,
    on_exit: Option<Action<R>>,
}

impl<R: Record> StateBuilder<R> {
    /// Start declaring the named state.
    pub fn new(name: impl Into<StateId>) -> Self {
        StateBuilder {
            id: name.into(),
            on_enter: None,
            on_entered: Vec::new(),
            on_exit: None,
        }
    }

    /// Action run before this state becomes current.
    pub fn on_enter(mut self, action: Action<R>) -> Self {
        self.on_enter = Some(action);
        self
    }

    /// Action run after this state has become current. May be called
    /// multiple times; actions run in the order added.
    pub fn on_entered(mut self, action: Action<R>) -> Self {
        self.on_entered.push(action);
        self
    }

    /// Action run when leaving this state, after the replacement state has
    /// been committed.
    pub fn on_exit(mut self, action: Action<R>) -> Self {
        self.on_exit = Some(action);
        self
    }

    pub(crate) fn id(&self) -> &StateId {
        &self.id
    }

    pub(crate) fn build(self) -> State<R> {
        State::new(self.id, self.on_enter, self.on_entered, self.on_exit)
    }
}
