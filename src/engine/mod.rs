//! The runtime: transition table, dispatch, and the firing protocol.
//!
//! A [`MachineDefinition`] is the compiled form of a
//! [`MachineBuilder`](crate::builder::MachineBuilder) declaration: states,
//! events with their ordered transitions, and the definition options. It is
//! read-only after construction; firing never mutates the table.
//!
//! # Firing
//!
//! `machine.fire(event, record)` resolves the event, snapshots the prior
//! state, marks the record's active event, and attempts the event's
//! candidate transitions in declaration order. The first passing guard
//! performs: state timestamps, enter, commit, entered, exit — in exactly
//! that order, with entry/exit suppressed on loopback. Nothing eligible
//! means `Ok(false)` and a rollback of the state column to the snapshot.

mod error;
mod event;
mod machine;
mod transition;

pub use error::MachineError;
pub use event::Event;
pub use machine::{MachineDefinition, StateFilter};
pub use transition::Transition;
