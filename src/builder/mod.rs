//! Fluent builders for declaring machine definitions.
//!
//! A definition is declared once per record type and compiled with
//! [`MachineBuilder::build`]; the builders are consumed in the process, so
//! the compiled table can never change afterwards.

pub mod error;
pub mod event;
pub mod machine;
pub mod state;
pub mod transition;

pub use error::DefinitionError;
pub use event::EventBuilder;
pub use machine::MachineBuilder;
pub use state::StateBuilder;
pub use transition::TransitionBuilder;

use crate::core::Guard;
use crate::record::Record;

/// Shorthand for an unguarded `from` → `to` declaration.
///
/// # Example
///
/// ```rust
/// use statebound::builder::simple_transition;
/// # use statebound::{Record, StateId, EventBuilder, MachineBuilder};
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
///     .event(EventBuilder::new("close").transition(simple_transition("open", "closed")))
///     .build()
///     .unwrap();
/// ```
pub fn simple_transition<R: Record>(
    from: impl Into<crate::core::StateId>,
    to: impl Into<crate::core::StateId>,
) -> TransitionBuilder<R> {
    TransitionBuilder::new().from(from).to(to)
}

/// Shorthand for a `from` → `to` declaration guarded by a predicate.
pub fn guarded_transition<R, F>(
    from: impl Into<crate::core::StateId>,
    to: impl Into<crate::core::StateId>,
    guard: F,
) -> TransitionBuilder<R>
where
    R: Record,
    F: Fn(&R) -> bool + Send + Sync + 'static,
{
    TransitionBuilder::new().from(from).to(to).guard(Guard::new(guard))
}
