//! Definition-time errors for the machine builder.

use thiserror::Error;

/// Errors raised while compiling a machine definition.
///
/// All of these are fatal: `build()` aborts and no partial definition is
/// usable.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The machine was declared without an initial state, or the initial
    /// state was never declared. Call `.initial(state)` and declare it.
    #[error("no initial state declared. Call .initial(state) and declare it with .state(..)")]
    NoInitialState,

    /// A state name was declared twice.
    #[error("state '{0}' declared more than once")]
    DuplicateState(String),

    /// An event name was declared twice.
    #[error("event '{0}' declared more than once")]
    DuplicateEvent(String),

    /// A transition was declared without a source state. Call `.from(state)`.
    #[error("event '{event}' has a transition with no source state. Call .from(state)")]
    MissingFromState { event: String },

    /// A transition was declared without a target state. Call `.to(state)`.
    #[error("event '{event}' has a transition with no target state. Call .to(state)")]
    MissingToState { event: String },

    /// A transition references a state the machine never declared.
    #[error("event '{event}' references undeclared state '{state}'")]
    UndeclaredState { event: String, state: String },
}
