//! Conditional-validation scoping.
//!
//! Records often carry validation rules that should only apply while they
//! occupy a particular state, or only while a particular event is firing
//! out of that state. This module lets definition code express that without
//! the engine ever evaluating a rule: a [`ValidationScope`] rewrites a
//! [`ValidationRule`]'s activation condition and forwards it to the record
//! type's [`ValidationRegistrar`].

mod rule;
mod scope;

pub use rule::{Predicate, ValidationRegistrar, ValidationRule};
pub use scope::ValidationScope;
