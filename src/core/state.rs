//! Named states and their lifecycle actions.

use crate::core::action::{Action, ActionError};
use crate::core::ids::StateId;
use crate::record::Record;
use std::fmt;

/// A named, mutually-exclusive condition a record can occupy.
///
/// Carries the state's lifecycle actions: an optional entry action (run
/// before the state becomes current), an ordered list of after-entry
/// actions (run after the commit), and an optional exit action (run after
/// the record has already moved on). A state never touches the record's
/// state field itself — it only invokes what was configured.
///
/// States are built through [`StateBuilder`](crate::builder::StateBuilder)
/// and immutable once the machine definition is built.
pub struct State<R> {
    id: StateId,
    on_enter: Option<Action<R>>,
    on_entered: Vec<Action<R>>,
    on_exit: Option<Action<R>>,
}

impl<R: Record> State<R> {
    pub(crate) fn new(
        id: StateId,
        on_enter: Option<Action<R>>,
        on_entered: Vec<Action<R>>,
        on_exit: Option<Action<R>>,
    ) -> Self {
        State {
            id,
            on_enter,
            on_entered,
            on_exit,
        }
    }

    /// The state's name.
    pub fn id(&self) -> &StateId {
        &self.id
    }

    /// Run the entry action, if one is configured.
    ///
    /// Called before the state becomes current.
    pub fn enter(&self, record: &mut R) -> Result<(), ActionError> {
        if let Some(action) = &self.on_enter {
            action.run(record)?;
        }
        Ok(())
    }

    /// Run the after-entry actions, in declared order.
    ///
    /// Called after the state has become current.
    pub fn entered(&self, record: &mut R) -> Result<(), ActionError> {
        for action in &self.on_entered {
            action.run(record)?;
        }
        Ok(())
    }

    /// Run the exit action, if one is configured.
    ///
    /// Called after the replacement state has been committed, so the action
    /// observes the record already in its new state.
    pub fn exit(&self, record: &mut R) -> Result<(), ActionError> {
        if let Some(action) = &self.on_exit {
            action.run(record)?;
        }
        Ok(())
    }
}

impl<R> Clone for State<R> {
    fn clone(&self) -> Self {
        State {
            id: self.id.clone(),
            on_enter: self.on_enter.clone(),
            on_entered: self.on_entered.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

impl<R> fmt::Debug for State<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_entered", &self.on_entered.len())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}
