//! Named events: ordered transition groups and first-match dispatch.

use crate::core::EventId;
use crate::engine::machine::MachineDefinition;
use crate::engine::transition::Transition;
use crate::engine::MachineError;
use crate::record::Record;
use std::fmt;

/// A named group of candidate transitions.
///
/// The transition list preserves declaration order, and that order is
/// semantically significant: dispatch attempts candidates first-to-last and
/// commits on the first passing guard. Two transitions sharing a `from` are
/// legal; the earlier declaration wins whenever both guards would pass.
///
/// Events are immutable once the machine definition is built.
pub struct Event<R> {
    name: EventId,
    transitions: Vec<Transition<R>>,
}

impl<R: Record> Event<R> {
    pub(crate) fn new(name: EventId, transitions: Vec<Transition<R>>) -> Self {
        Event { name, transitions }
    }

    /// The event's name.
    pub fn name(&self) -> &EventId {
        &self.name
    }

    /// Every transition in declaration order.
    pub fn transitions(&self) -> &[Transition<R>] {
        &self.transitions
    }

    /// The transitions whose `from` matches the record's current state,
    /// in declaration order. Empty when the record's state is unset.
    pub fn next_transitions<'a>(&'a self, record: &R) -> Vec<&'a Transition<R>> {
        match record.current_state() {
            Some(current) => self
                .transitions
                .iter()
                .filter(|t| *t.from() == current)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Attempt the event against the record.
    ///
    /// Candidates are tried in declaration order; the first one whose
    /// perform succeeds stops the scan. `Ok(false)` — nothing fired — is a
    /// normal negative outcome, not an error. An action failure aborts the
    /// scan and propagates.
    pub fn fire(
        &self,
        machine: &MachineDefinition<R>,
        record: &mut R,
    ) -> Result<bool, MachineError> {
        let current = match record.current_state() {
            Some(current) => current,
            None => return Ok(false),
        };

        for transition in &self.transitions {
            if *transition.from() != current {
                continue;
            }
            if transition.perform(machine, record)? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl<R> Clone for Event<R> {
    fn clone(&self) -> Self {
        Event {
            name: self.name.clone(),
            transitions: self.transitions.clone(),
        }
    }
}

impl<R> fmt::Debug for Event<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Guard, StateId};

    #[derive(Default)]
    struct TestRecord {
        state: Option<StateId>,
    }

    impl Record for TestRecord {
        fn current_state(&self) -> Option<StateId> {
            self.state.clone()
        }

        fn set_current_state(&mut self, state: &StateId) {
            self.state = Some(state.clone());
        }

        fn is_valid(&self) -> bool {
            true
        }
    }

    fn edge(from: &str, to: &str) -> Transition<TestRecord> {
        Transition::new(StateId::new(from), StateId::new(to), None)
    }

    fn guarded(from: &str, to: &str, pass: bool) -> Transition<TestRecord> {
        Transition::new(
            StateId::new(from),
            StateId::new(to),
            Some(Guard::new(move |_: &TestRecord| pass)),
        )
    }

    #[test]
    fn next_transitions_filters_by_current_state() {
        let event = Event::new(
            EventId::new("advance"),
            vec![edge("open", "review"), edge("review", "closed")],
        );

        let record = TestRecord {
            state: Some(StateId::new("review")),
        };

        let candidates = event.next_transitions(&record);
        assert_eq!(candidates.len(), 1);
        assert_eq!(*candidates[0].to(), "closed");
    }

    #[test]
    fn next_transitions_preserves_declaration_order() {
        let event = Event::new(
            EventId::new("route"),
            vec![
                guarded("open", "review", false),
                guarded("open", "closed", true),
                edge("open", "archived"),
            ],
        );

        let record = TestRecord {
            state: Some(StateId::new("open")),
        };

        let targets: Vec<_> = event
            .next_transitions(&record)
            .iter()
            .map(|t| t.to().to_string())
            .collect();
        assert_eq!(targets, vec!["review", "closed", "archived"]);
    }

    #[test]
    fn next_transitions_is_empty_for_an_uninitialized_record() {
        let event = Event::new(EventId::new("advance"), vec![edge("open", "closed")]);
        let record = TestRecord::default();

        assert!(event.next_transitions(&record).is_empty());
    }
}
