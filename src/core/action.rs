//! Lifecycle actions and transition guards.
//!
//! Both come in two forms with one uniform "run this against the record"
//! contract: a closure, or the name of a method the record dispatches
//! itself through the [`Record`](crate::record::Record) adapter.

use crate::record::Record;
use std::fmt;
use std::sync::Arc;

/// Failure raised by a lifecycle action.
///
/// The engine never inspects or wraps the payload beyond boxing: whatever a
/// user action fails with propagates out of the firing call unmodified.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

type ActionFn<R> = Arc<dyn Fn(&mut R) -> Result<(), ActionError> + Send + Sync>;
type GuardFn<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// A zero-argument operation run against a record.
///
/// Actions fire on state entry, after entry, and on state exit. They may
/// mutate the record but must never touch its state field — committing the
/// state is the transition's job alone.
///
/// # Example
///
/// ```rust
/// use statebound::Action;
/// # use statebound::{Record, StateId};
/// # struct Ticket { notes: Vec<String>, state: Option<StateId> }
/// # impl Record for Ticket {
/// #     fn current_state(&self) -> Option<StateId> { self.state.clone() }
/// #     fn set_current_state(&mut self, s: &StateId) { self.state = Some(s.clone()); }
/// #     fn is_valid(&self) -> bool { true }
/// # }
///
/// // Dispatched by name through the record adapter:
/// let notify: Action<Ticket> = Action::method("notify_owner");
///
/// // Or a closure bound directly:
/// let log: Action<Ticket> = Action::new(|t: &mut Ticket| {
///     t.notes.push("archived".to_string());
/// });
/// ```
pub struct Action<R> {
    kind: ActionKind<R>,
}

enum ActionKind<R> {
    Method(String),
    Closure(ActionFn<R>),
}

impl<R: Record> Action<R> {
    /// An action dispatched by name through [`Record::run_named_action`].
    pub fn method(name: impl Into<String>) -> Self {
        Action {
            kind: ActionKind::Method(name.into()),
        }
    }

    /// An infallible closure action.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut R) + Send + Sync + 'static,
    {
        Action {
            kind: ActionKind::Closure(Arc::new(move |record| {
                f(record);
                Ok(())
            })),
        }
    }

    /// A fallible closure action. A returned error aborts the in-progress
    /// firing and propagates to the caller unmodified.
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn(&mut R) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Action {
            kind: ActionKind::Closure(Arc::new(f)),
        }
    }

    /// Run the action against the record.
    pub fn run(&self, record: &mut R) -> Result<(), ActionError> {
        match &self.kind {
            ActionKind::Method(name) => record.run_named_action(name),
            ActionKind::Closure(f) => f(record),
        }
    }
}

impl<R> Clone for Action<R> {
    fn clone(&self) -> Self {
        Action {
            kind: match &self.kind {
                ActionKind::Method(name) => ActionKind::Method(name.clone()),
                ActionKind::Closure(f) => ActionKind::Closure(Arc::clone(f)),
            },
        }
    }
}

impl<R> fmt::Debug for Action<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActionKind::Method(name) => f.debug_tuple("Action::Method").field(name).finish(),
            ActionKind::Closure(_) => f.write_str("Action::Closure"),
        }
    }
}

/// A predicate gating whether a transition may be performed.
///
/// Evaluated against the record without mutating it. A guard returning
/// `false` makes the transition ineligible — a normal negative outcome,
/// never an error.
///
/// # Example
///
/// ```rust
/// use statebound::Guard;
/// # use statebound::{Record, StateId};
/// # struct Ticket { reviewed: bool, state: Option<StateId> }
/// # impl Record for Ticket {
/// #     fn current_state(&self) -> Option<StateId> { self.state.clone() }
/// #     fn set_current_state(&mut self, s: &StateId) { self.state = Some(s.clone()); }
/// #     fn is_valid(&self) -> bool { true }
/// # }
///
/// let reviewed = Guard::new(|t: &Ticket| t.reviewed);
/// let named: Guard<Ticket> = Guard::method("closable");
/// ```
pub struct Guard<R> {
    kind: GuardKind<R>,
}

enum GuardKind<R> {
    Method(String),
    Closure(GuardFn<R>),
}

impl<R: Record> Guard<R> {
    /// A guard dispatched by name through [`Record::eval_named_guard`].
    pub fn method(name: impl Into<String>) -> Self {
        Guard {
            kind: GuardKind::Method(name.into()),
        }
    }

    /// A guard from a predicate closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Guard {
            kind: GuardKind::Closure(Arc::new(f)),
        }
    }

    /// Evaluate the predicate against the record.
    pub fn check(&self, record: &R) -> bool {
        match &self.kind {
            GuardKind::Method(name) => record.eval_named_guard(name),
            GuardKind::Closure(f) => f(record),
        }
    }
}

impl<R> Clone for Guard<R> {
    fn clone(&self) -> Self {
        Guard {
            kind: match &self.kind {
                GuardKind::Method(name) => GuardKind::Method(name.clone()),
                GuardKind::Closure(f) => GuardKind::Closure(Arc::clone(f)),
            },
        }
    }
}

impl<R> fmt::Debug for Guard<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GuardKind::Method(name) => f.debug_tuple("Guard::Method").field(name).finish(),
            GuardKind::Closure(_) => f.write_str("Guard::Closure"),
        }
    }
}
