//! Interned identifiers for states and events.
//!
//! A machine definition names its states and events once; everything after
//! that passes cheap handles around. Identifiers are immutable, cheaply
//! cloneable, and serialize as their canonical textual form — the same form
//! a record's state column persists.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of a state within one machine definition.
///
/// Unique within a definition. The textual form is the canonical persisted
/// representation of a record's current state.
///
/// # Example
///
/// ```rust
/// use statebound::StateId;
///
/// let open = StateId::new("open");
/// assert_eq!(open.as_str(), "open");
/// assert_eq!(open.to_string(), "open");
/// assert_eq!(open, StateId::new("open"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(Arc<str>);

impl StateId {
    /// Intern a state name.
    pub fn new(name: impl AsRef<str>) -> Self {
        StateId(Arc::from(name.as_ref()))
    }

    /// The canonical textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateId {
    fn from(name: &str) -> Self {
        StateId::new(name)
    }
}

impl From<String> for StateId {
    fn from(name: String) -> Self {
        StateId::new(name)
    }
}

impl PartialEq<str> for StateId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for StateId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for StateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(StateId::new(name))
    }
}

/// Name of an event within one machine definition.
///
/// Unique within a definition. Also surfaced through the record's
/// active-event marker while a firing is in progress.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(Arc<str>);

impl EventId {
    /// Intern an event name.
    pub fn new(name: impl AsRef<str>) -> Self {
        EventId(Arc::from(name.as_ref()))
    }

    /// The canonical textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(name: &str) -> Self {
        EventId::new(name)
    }
}

impl From<String> for EventId {
    fn from(name: String) -> Self {
        EventId::new(name)
    }
}

impl PartialEq<str> for EventId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for EventId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for EventId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EventId::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_id_compares_by_name() {
        assert_eq!(StateId::new("open"), StateId::new("open"));
        assert_ne!(StateId::new("open"), StateId::new("closed"));
        assert_eq!(StateId::new("open"), "open");
    }

    #[test]
    fn clone_shares_the_interned_name() {
        let id = StateId::new("open");
        let cloned = id.clone();
        assert_eq!(id, cloned);
        assert_eq!(cloned.as_str(), "open");
    }

    #[test]
    fn display_is_the_canonical_form() {
        assert_eq!(StateId::new("awaiting_review").to_string(), "awaiting_review");
        assert_eq!(EventId::new("close").to_string(), "close");
    }

    #[test]
    fn state_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&StateId::new("open")).unwrap();
        assert_eq!(json, "\"open\"");

        let back: StateId = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(back, StateId::new("closed"));
    }

    #[test]
    fn event_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&EventId::new("close")).unwrap();
        assert_eq!(json, "\"close\"");

        let back: EventId = serde_json::from_str("\"close\"").unwrap();
        assert_eq!(back, EventId::new("close"));
    }

    #[test]
    fn lookup_by_str_works_through_borrow() {
        use std::collections::HashMap;

        let mut map: HashMap<StateId, u32> = HashMap::new();
        map.insert(StateId::new("open"), 1);
        assert_eq!(map.get("open"), Some(&1));
        assert_eq!(map.get("closed"), None);
    }
}
