//! Statebound: a declarative lifecycle state machine for persistent records.
//!
//! A machine definition is declared once per record type — states, named
//! events with guarded transitions, and lifecycle actions — and compiled
//! into an immutable transition table. At runtime, firing an event against
//! a record evaluates guards in declaration order, runs the lifecycle
//! callbacks in a fixed order (enter → commit → entered → exit), and
//! commits the new state through the [`Record`] adapter. The engine never
//! touches storage: reading and writing the state column, record validity,
//! named action dispatch, and timestamp bookkeeping all go through the
//! adapter.
//!
//! # Core Concepts
//!
//! - **State**: a named condition with optional enter/after-entry/exit actions
//! - **Event**: an ordered group of guarded transitions; first match wins
//! - **Guard**: a predicate conjoined with the record's validity check
//! - **Record**: the adapter contract the host record type satisfies
//! - **Loopback**: a self-transition; commits but suppresses callbacks
//!
//! # Example
//!
//! ```rust
//! use statebound::{
//!     Action, EventBuilder, MachineBuilder, Record, StateBuilder, StateId, TransitionBuilder,
//! };
//!
//! struct Order {
//!     state: Option<StateId>,
//!     notices: Vec<String>,
//! }
//!
//! impl Record for Order {
//!     fn current_state(&self) -> Option<StateId> {
//!         self.state.clone()
//!     }
//!
//!     fn set_current_state(&mut self, state: &StateId) {
//!         self.state = Some(state.clone());
//!     }
//!
//!     fn is_valid(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let machine = MachineBuilder::<Order>::new()
//!     .initial("open")
//!     .state(StateBuilder::new("open"))
//!     .state(StateBuilder::new("closed").on_entered(Action::new(|o: &mut Order| {
//!         o.notices.push("order closed".to_string());
//!     })))
//!     .event(
//!         EventBuilder::new("close")
//!             .transition(TransitionBuilder::new().from("open").to("closed")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut order = Order { state: None, notices: Vec::new() };
//! machine.initialize_record(&mut order);
//! assert!(machine.in_state(&order, "open").unwrap());
//!
//! assert!(machine.fire("close", &mut order).unwrap());
//! assert_eq!(order.state, Some(StateId::new("closed")));
//! assert_eq!(order.notices, vec!["order closed"]);
//!
//! // No transition leaves "closed": a normal negative, not an error.
//! assert!(!machine.fire("close", &mut order).unwrap());
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod record;
pub mod validation;

// Re-export commonly used types
pub use builder::{DefinitionError, EventBuilder, MachineBuilder, StateBuilder, TransitionBuilder};
pub use core::{Action, ActionError, EventId, Guard, State, StateId};
pub use engine::{Event, MachineDefinition, MachineError, StateFilter, Transition};
pub use record::Record;
pub use validation::{ValidationRegistrar, ValidationRule, ValidationScope};
