//! Validation rule descriptors and the registration seam.

use crate::record::Record;
use std::fmt;
use std::sync::Arc;

/// Activation predicate of a validation rule.
pub type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// A named validation rule with arbitrary arguments and an optional
/// activation condition.
///
/// The engine never evaluates rules — it only rewrites their activation
/// condition (see [`ValidationScope`](crate::validation::ValidationScope))
/// and forwards them to the record type's [`ValidationRegistrar`]. The
/// arguments are carried opaquely as JSON for the registrar to interpret.
pub struct ValidationRule<R> {
    pub(crate) name: String,
    pub(crate) args: serde_json::Value,
    pub(crate) condition: Option<Predicate<R>>,
}

impl<R: Record> ValidationRule<R> {
    /// A rule with no arguments and no condition.
    pub fn new(name: impl Into<String>) -> Self {
        ValidationRule {
            name: name.into(),
            args: serde_json::Value::Null,
            condition: None,
        }
    }

    /// Attach arbitrary arguments for the registrar.
    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = args;
        self
    }

    /// Attach an activation condition. Scoping conjoins onto this — the
    /// caller's condition must still pass after decoration.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// The rule's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule's arguments.
    pub fn args(&self) -> &serde_json::Value {
        &self.args
    }

    /// Whether the rule is currently active for the record. A rule with no
    /// condition is always active.
    pub fn applies_to(&self, record: &R) -> bool {
        self.condition.as_ref().is_none_or(|c| c(record))
    }
}

impl<R> Clone for ValidationRule<R> {
    fn clone(&self) -> Self {
        ValidationRule {
            name: self.name.clone(),
            args: self.args.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<R> fmt::Debug for ValidationRule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// The record type's rule-registration mechanism.
///
/// External validation infrastructure implements this; the engine only
/// forwards (possibly decorated) rules into it.
pub trait ValidationRegistrar<R> {
    /// Accept a rule descriptor.
    fn register(&mut self, rule: ValidationRule<R>);
}
