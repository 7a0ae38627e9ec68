//! The compiled machine definition and the full firing protocol.

use crate::core::{EventId, State, StateId};
use crate::engine::event::Event;
use crate::engine::transition::Transition;
use crate::engine::MachineError;
use crate::record::Record;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A compiled machine definition: the transition table plus its options.
///
/// Built once per record type through
/// [`MachineBuilder`](crate::builder::MachineBuilder) and read-only
/// thereafter. One definition may be shared across threads operating on
/// different records; per-record confinement during a firing call is the
/// caller's responsibility.
pub struct MachineDefinition<R> {
    states: HashMap<StateId, State<R>>,
    initial: StateId,
    events: HashMap<EventId, Event<R>>,
    state_column: String,
    record_state_timestamps: bool,
}

impl<R: Record> MachineDefinition<R> {
    pub(crate) fn new(
        states: HashMap<StateId, State<R>>,
        initial: StateId,
        events: HashMap<EventId, Event<R>>,
        state_column: String,
        record_state_timestamps: bool,
    ) -> Self {
        MachineDefinition {
            states,
            initial,
            events,
            state_column,
            record_state_timestamps,
        }
    }

    /// The state newly created records start in.
    pub fn initial_state(&self) -> &StateId {
        &self.initial
    }

    /// The record field holding the current state.
    pub fn state_column(&self) -> &str {
        &self.state_column
    }

    /// Whether performed transitions write state timestamps.
    pub fn record_state_timestamps(&self) -> bool {
        self.record_state_timestamps
    }

    /// Look up a declared state by name.
    pub fn state(&self, name: &str) -> Option<&State<R>> {
        self.states.get(name)
    }

    /// Look up a declared event by name.
    pub fn event(&self, name: &str) -> Option<&Event<R>> {
        self.events.get(name)
    }

    /// Every declared state id.
    pub fn state_ids(&self) -> impl Iterator<Item = &StateId> {
        self.states.keys()
    }

    /// Every declared event id.
    pub fn event_ids(&self) -> impl Iterator<Item = &EventId> {
        self.events.keys()
    }

    /// Whether the record currently occupies the named state.
    ///
    /// The state name must be declared; unknown names are
    /// [`MachineError::InvalidState`]. An uninitialized record is in no
    /// state.
    pub fn in_state(&self, record: &R, name: &str) -> Result<bool, MachineError> {
        let state = self
            .state(name)
            .ok_or_else(|| MachineError::InvalidState(name.to_string()))?;
        Ok(record
            .current_state()
            .is_some_and(|current| current == *state.id()))
    }

    /// Write the initial state into an uninitialized record's state column.
    /// Records already holding a state are left untouched.
    pub fn initialize_record(&self, record: &mut R) {
        if record.current_state().is_none() {
            record.set_current_state(&self.initial);
        }
    }

    /// Run the initial state's enter and after-entry actions.
    ///
    /// Meant for the moment a record is first created, after
    /// [`initialize_record`](Self::initialize_record).
    pub fn run_initial_state_actions(&self, record: &mut R) -> Result<(), MachineError> {
        let initial = self
            .states
            .get(&self.initial)
            .ok_or_else(|| MachineError::InvalidState(self.initial.to_string()))?;
        initial.enter(record)?;
        initial.entered(record)?;
        Ok(())
    }

    /// Fire an event against a record: the full firing protocol.
    ///
    /// Snapshots the prior state, marks the record's active event, lets the
    /// event dispatch, clears the marker, and — when nothing fired — rolls
    /// the state column back to the snapshot through
    /// [`Record::rollback_state`]. `Ok(true)` means a transition performed;
    /// `Ok(false)` is the normal not-fired outcome and guarantees the
    /// observable state is unchanged. Action failures propagate unmodified
    /// (the marker is still cleared; no rollback is attempted).
    pub fn fire(&self, event_name: &str, record: &mut R) -> Result<bool, MachineError> {
        let event = self
            .events
            .get(event_name)
            .ok_or_else(|| MachineError::UnknownEvent(event_name.to_string()))?;

        let previous = record.current_state();
        record.set_active_event(Some(event.name().clone()));
        let outcome = event.fire(self, record);
        record.set_active_event(None);

        match outcome {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::trace!(event = %event.name(), "no transition fired");
                record.rollback_state(previous.as_ref());
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// The state the record would land in if the event fired now, ignoring
    /// guards: the first declared candidate's target.
    pub fn next_state_for_event(
        &self,
        event_name: &str,
        record: &R,
    ) -> Result<Option<StateId>, MachineError> {
        let candidates = self.next_states_for_event(event_name, record)?;
        Ok(candidates.first().map(|t| t.to().clone()))
    }

    /// Every candidate transition for the event from the record's current
    /// state, in declaration order, ignoring guards.
    pub fn next_states_for_event(
        &self,
        event_name: &str,
        record: &R,
    ) -> Result<Vec<&Transition<R>>, MachineError> {
        let event = self
            .events
            .get(event_name)
            .ok_or_else(|| MachineError::UnknownEvent(event_name.to_string()))?;
        Ok(event.next_transitions(record))
    }

    /// Describe a "records in any of these states" query for an external
    /// query layer. Unknown names are [`MachineError::InvalidState`].
    pub fn in_state_filter<'a, I>(&self, names: I) -> Result<StateFilter, MachineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.build_filter(names, false)
    }

    /// Describe the complementary "records in none of these states" query.
    pub fn not_in_state_filter<'a, I>(&self, names: I) -> Result<StateFilter, MachineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.build_filter(names, true)
    }

    fn build_filter<'a, I>(&self, names: I, negated: bool) -> Result<StateFilter, MachineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut states = Vec::new();
        for name in names {
            let state = self
                .state(name)
                .ok_or_else(|| MachineError::InvalidState(name.to_string()))?;
            states.push(state.id().clone());
        }
        Ok(StateFilter {
            column: self.state_column.clone(),
            states,
            negated,
        })
    }
}

impl<R> fmt::Debug for MachineDefinition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("initial", &self.initial)
            .field("states", &self.states.len())
            .field("events", &self.events.len())
            .field("state_column", &self.state_column)
            .field("record_state_timestamps", &self.record_state_timestamps)
            .finish()
    }
}

/// A validated state query, ready for an external query layer to translate.
///
/// The engine validates the state names and supplies the column; it never
/// builds or runs the query itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateFilter {
    column: String,
    states: Vec<StateId>,
    negated: bool,
}

impl StateFilter {
    /// The record field the query should compare.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The states to match, in the order given.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// `false` for "in any of", `true` for "in none of".
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{EventBuilder, MachineBuilder, StateBuilder, TransitionBuilder};
    use crate::core::{Action, ActionError, Guard};
    use chrono::{DateTime, Utc};
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Default)]
    struct TestRecord {
        state: Option<StateId>,
        valid: bool,
        log: Vec<String>,
        active: Option<EventId>,
        rollbacks: Vec<Option<StateId>>,
        timestamp_fields: BTreeSet<String>,
        timestamps: BTreeMap<String, DateTime<Utc>>,
    }

    impl TestRecord {
        fn valid_in(state: &str) -> Self {
            TestRecord {
                state: Some(StateId::new(state)),
                valid: true,
                ..TestRecord::default()
            }
        }

        fn with_timestamp_fields(mut self, fields: &[&str]) -> Self {
            self.timestamp_fields = fields.iter().map(|f| f.to_string()).collect();
            self
        }
    }

    impl Record for TestRecord {
        fn current_state(&self) -> Option<StateId> {
            self.state.clone()
        }

        fn set_current_state(&mut self, state: &StateId) {
            self.log.push(format!("commit:{state}"));
            self.state = Some(state.clone());
        }

        fn rollback_state(&mut self, previous: Option<&StateId>) {
            self.rollbacks.push(previous.cloned());
            self.state = previous.cloned();
        }

        fn is_valid(&self) -> bool {
            self.valid
        }

        fn run_named_action(&mut self, name: &str) -> Result<(), ActionError> {
            if name == "explode" {
                return Err("explode failed".into());
            }
            self.log.push(format!("action:{name}"));
            Ok(())
        }

        fn eval_named_guard(&self, name: &str) -> bool {
            name == "pass"
        }

        fn active_event(&self) -> Option<EventId> {
            self.active.clone()
        }

        fn set_active_event(&mut self, event: Option<EventId>) {
            self.active = event;
        }

        fn write_timestamp_if_absent(&mut self, field: &str, at: DateTime<Utc>) {
            if self.timestamp_fields.contains(field) && !self.timestamps.contains_key(field) {
                self.timestamps.insert(field.to_string(), at);
            }
        }

        fn write_timestamp_always(&mut self, field: &str, at: DateTime<Utc>) {
            if self.timestamp_fields.contains(field) {
                self.timestamps.insert(field.to_string(), at);
            }
        }
    }

    fn note(message: &'static str) -> Action<TestRecord> {
        Action::new(move |r: &mut TestRecord| r.log.push(message.to_string()))
    }

    /// open --close--> closed, with lifecycle actions on both states.
    fn open_closed_machine() -> MachineDefinition<TestRecord> {
        MachineBuilder::new()
            .initial("open")
            .state(StateBuilder::new("open").on_exit(note("exit:open")))
            .state(
                StateBuilder::new("closed")
                    .on_enter(note("enter:closed"))
                    .on_entered(note("entered:closed")),
            )
            .event(
                EventBuilder::new("close")
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn firing_with_no_matching_from_leaves_state_unchanged() {
        let machine = open_closed_machine();
        let mut record = TestRecord::valid_in("closed");

        let fired = machine.fire("close", &mut record).unwrap();
        assert!(!fired);
        assert_eq!(record.state, Some(StateId::new("closed")));
        assert!(record.log.iter().all(|l| !l.starts_with("commit")));
    }

    #[test]
    fn firing_with_a_rejecting_guard_runs_no_actions() {
        let machine = MachineBuilder::new()
            .initial("open")
            .state(StateBuilder::new("open").on_exit(note("exit:open")))
            .state(StateBuilder::new("closed").on_enter(note("enter:closed")))
            .event(
                EventBuilder::new("close").transition(
                    TransitionBuilder::new()
                        .from("open")
                        .to("closed")
                        .guard(Guard::method("fail")),
                ),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open");

        let fired = machine.fire("close", &mut record).unwrap();
        assert!(!fired);
        assert_eq!(record.state, Some(StateId::new("open")));
        assert!(record.log.is_empty());
    }

    #[test]
    fn an_invalid_record_fails_every_guard() {
        let machine = open_closed_machine();
        let mut record = TestRecord::valid_in("open");
        record.valid = false;

        let fired = machine.fire("close", &mut record).unwrap();
        assert!(!fired);
        assert_eq!(record.state, Some(StateId::new("open")));
    }

    #[test]
    fn a_performed_transition_orders_enter_commit_entered_exit() {
        let machine = open_closed_machine();
        let mut record = TestRecord::valid_in("open");

        let fired = machine.fire("close", &mut record).unwrap();
        assert!(fired);
        assert_eq!(record.state, Some(StateId::new("closed")));
        assert_eq!(
            record.log,
            vec![
                "enter:closed",
                "commit:closed",
                "entered:closed",
                "exit:open"
            ]
        );
    }

    #[test]
    fn each_lifecycle_action_runs_exactly_once() {
        let machine = open_closed_machine();
        let mut record = TestRecord::valid_in("open");

        machine.fire("close", &mut record).unwrap();
        for entry in ["enter:closed", "entered:closed", "exit:open"] {
            assert_eq!(record.log.iter().filter(|l| *l == entry).count(), 1);
        }
    }

    #[test]
    fn loopback_commits_but_suppresses_callbacks() {
        let machine = MachineBuilder::new()
            .initial("open")
            .state(
                StateBuilder::new("open")
                    .on_enter(note("enter:open"))
                    .on_entered(note("entered:open"))
                    .on_exit(note("exit:open")),
            )
            .event(
                EventBuilder::new("refresh")
                    .transition(TransitionBuilder::new().from("open").to("open")),
            )
            .build()
            .unwrap();
        let mut record =
            TestRecord::valid_in("open").with_timestamp_fields(&["open_updated_at"]);

        let fired = machine.fire("refresh", &mut record).unwrap();
        assert!(fired);
        assert_eq!(record.log, vec!["commit:open"]);
        assert!(record.timestamps.contains_key("open_updated_at"));
    }

    #[test]
    fn first_declared_passing_guard_wins() {
        let machine = MachineBuilder::new()
            .initial("open")
            .states(["open", "review", "closed"])
            .event(
                EventBuilder::new("route")
                    .transition(
                        TransitionBuilder::new()
                            .from("open")
                            .to("review")
                            .guard(Guard::method("pass")),
                    )
                    .transition(
                        TransitionBuilder::new()
                            .from("open")
                            .to("closed")
                            .guard(Guard::method("pass")),
                    ),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open");

        machine.fire("route", &mut record).unwrap();
        assert_eq!(record.state, Some(StateId::new("review")));
    }

    #[test]
    fn a_rejected_candidate_falls_through_to_the_next() {
        let machine = MachineBuilder::new()
            .initial("open")
            .states(["open", "review", "closed"])
            .event(
                EventBuilder::new("route")
                    .transition(
                        TransitionBuilder::new()
                            .from("open")
                            .to("review")
                            .guard(Guard::method("fail")),
                    )
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open");

        machine.fire("route", &mut record).unwrap();
        assert_eq!(record.state, Some(StateId::new("closed")));
    }

    #[test]
    fn round_trip_close_then_close_again() {
        let machine = MachineBuilder::new()
            .initial("open")
            .states(["open", "closed"])
            .event(
                EventBuilder::new("close").transition(
                    TransitionBuilder::new()
                        .from("open")
                        .to("closed")
                        .guard(Guard::new(|r: &TestRecord| {
                            r.current_state().is_some_and(|s| s == "open")
                        })),
                ),
            )
            .build()
            .unwrap();

        let mut record = TestRecord {
            valid: true,
            ..TestRecord::default()
        };
        machine.initialize_record(&mut record);
        assert_eq!(record.state, Some(StateId::new("open")));

        assert!(machine.fire("close", &mut record).unwrap());
        assert_eq!(record.state, Some(StateId::new("closed")));

        assert!(!machine.fire("close", &mut record).unwrap());
        assert_eq!(record.state, Some(StateId::new("closed")));
    }

    #[test]
    fn a_failed_firing_rolls_back_through_the_adapter() {
        let machine = open_closed_machine();
        let mut record = TestRecord::valid_in("open");
        record.valid = false;

        machine.fire("close", &mut record).unwrap();
        assert_eq!(record.rollbacks, vec![Some(StateId::new("open"))]);
        assert_eq!(record.state, Some(StateId::new("open")));
    }

    #[test]
    fn a_successful_firing_never_rolls_back() {
        let machine = open_closed_machine();
        let mut record = TestRecord::valid_in("open");

        machine.fire("close", &mut record).unwrap();
        assert!(record.rollbacks.is_empty());
    }

    #[test]
    fn the_active_event_marker_is_set_during_and_cleared_after_firing() {
        let machine = MachineBuilder::new()
            .initial("open")
            .state(StateBuilder::new("open"))
            .state(StateBuilder::new("closed").on_enter(Action::new(|r: &mut TestRecord| {
                let active = r.active_event().map(|e| e.to_string());
                r.log.push(format!("active:{}", active.as_deref().unwrap_or("-")));
            })))
            .event(
                EventBuilder::new("close")
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open");

        machine.fire("close", &mut record).unwrap();
        assert!(record.log.contains(&"active:close".to_string()));
        assert_eq!(record.active_event(), None);
    }

    #[test]
    fn a_failing_entry_action_aborts_before_commit() {
        let machine = MachineBuilder::new()
            .initial("open")
            .state(StateBuilder::new("open").on_exit(note("exit:open")))
            .state(StateBuilder::new("closed").on_enter(Action::method("explode")))
            .event(
                EventBuilder::new("close")
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open");

        let err = machine.fire("close", &mut record).unwrap_err();
        assert!(matches!(err, MachineError::Action(_)));
        assert_eq!(record.state, Some(StateId::new("open")));
        assert!(record.log.iter().all(|l| !l.starts_with("commit")));
        assert_eq!(record.active_event(), None);
    }

    #[test]
    fn a_failing_exit_action_leaves_the_new_state_committed() {
        let machine = MachineBuilder::new()
            .initial("open")
            .state(StateBuilder::new("open").on_exit(Action::method("explode")))
            .state(StateBuilder::new("closed"))
            .event(
                EventBuilder::new("close")
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open");

        let err = machine.fire("close", &mut record).unwrap_err();
        assert!(matches!(err, MachineError::Action(_)));
        assert_eq!(record.state, Some(StateId::new("closed")));
    }

    #[test]
    fn first_exit_writes_created_timestamps_and_never_overwrites_them() {
        let machine = MachineBuilder::new()
            .initial("open")
            .states(["open", "closed"])
            .event(
                EventBuilder::new("close")
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .event(
                EventBuilder::new("reopen")
                    .transition(TransitionBuilder::new().from("closed").to("open")),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open")
            .with_timestamp_fields(&["open_created_at", "open_updated_at"]);

        machine.fire("close", &mut record).unwrap();
        let created = record.timestamps["open_created_at"];

        machine.fire("reopen", &mut record).unwrap();
        machine.fire("close", &mut record).unwrap();
        assert_eq!(record.timestamps["open_created_at"], created);
        assert!(record.timestamps["open_updated_at"] >= created);
    }

    #[test]
    fn timestamp_bookkeeping_can_be_disabled() {
        let machine = MachineBuilder::new()
            .initial("open")
            .record_state_timestamps(false)
            .states(["open", "closed"])
            .event(
                EventBuilder::new("close")
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::valid_in("open")
            .with_timestamp_fields(&["open_created_at", "open_updated_at"]);

        machine.fire("close", &mut record).unwrap();
        assert!(record.timestamps.is_empty());
    }

    #[test]
    fn firing_an_undeclared_event_is_an_error() {
        let machine = open_closed_machine();
        let mut record = TestRecord::valid_in("open");

        let err = machine.fire("vanish", &mut record).unwrap_err();
        assert!(matches!(err, MachineError::UnknownEvent(_)));
    }

    #[test]
    fn in_state_matches_only_the_current_state() {
        let machine = open_closed_machine();
        let record = TestRecord::valid_in("open");

        assert!(machine.in_state(&record, "open").unwrap());
        assert!(!machine.in_state(&record, "closed").unwrap());
    }

    #[test]
    fn in_state_rejects_undeclared_names() {
        let machine = open_closed_machine();
        let record = TestRecord::valid_in("open");

        let err = machine.in_state(&record, "limbo").unwrap_err();
        assert!(matches!(err, MachineError::InvalidState(_)));
    }

    #[test]
    fn an_uninitialized_record_is_in_no_state() {
        let machine = open_closed_machine();
        let record = TestRecord::default();

        assert!(!machine.in_state(&record, "open").unwrap());
    }

    #[test]
    fn initialize_record_is_idempotent() {
        let machine = open_closed_machine();
        let mut record = TestRecord::default();

        machine.initialize_record(&mut record);
        assert_eq!(record.state, Some(StateId::new("open")));

        record.state = Some(StateId::new("closed"));
        machine.initialize_record(&mut record);
        assert_eq!(record.state, Some(StateId::new("closed")));
    }

    #[test]
    fn initial_state_actions_run_enter_then_entered() {
        let machine = MachineBuilder::new()
            .initial("open")
            .state(
                StateBuilder::new("open")
                    .on_enter(note("enter:open"))
                    .on_entered(note("entered:open")),
            )
            .build()
            .unwrap();
        let mut record = TestRecord::default();

        machine.initialize_record(&mut record);
        machine.run_initial_state_actions(&mut record).unwrap();
        assert_eq!(record.log[1..], ["enter:open", "entered:open"]);
    }

    #[test]
    fn next_state_for_event_reports_the_first_candidate_target() {
        let machine = MachineBuilder::new()
            .initial("open")
            .states(["open", "review", "closed"])
            .event(
                EventBuilder::new("route")
                    .transition(TransitionBuilder::new().from("open").to("review"))
                    .transition(TransitionBuilder::new().from("open").to("closed")),
            )
            .build()
            .unwrap();
        let record = TestRecord::valid_in("open");

        let next = machine.next_state_for_event("route", &record).unwrap();
        assert_eq!(next, Some(StateId::new("review")));

        let all = machine.next_states_for_event("route", &record).unwrap();
        assert_eq!(all.len(), 2);

        let err = machine.next_state_for_event("vanish", &record).unwrap_err();
        assert!(matches!(err, MachineError::UnknownEvent(_)));
    }

    #[test]
    fn state_filters_carry_the_configured_column() {
        let machine = MachineBuilder::<TestRecord>::new()
            .initial("open")
            .column("status")
            .states(["open", "closed"])
            .build()
            .unwrap();

        let filter = machine.in_state_filter(["open", "closed"]).unwrap();
        assert_eq!(filter.column(), "status");
        assert_eq!(filter.states().len(), 2);
        assert!(!filter.is_negated());

        let negated = machine.not_in_state_filter(["closed"]).unwrap();
        assert!(negated.is_negated());
    }

    #[test]
    fn state_filters_reject_undeclared_names() {
        let machine = open_closed_machine();

        let err = machine.in_state_filter(["open", "limbo"]).unwrap_err();
        assert!(matches!(err, MachineError::InvalidState(_)));

        let err = machine.not_in_state_filter(["limbo"]).unwrap_err();
        assert!(matches!(err, MachineError::InvalidState(_)));
    }

    #[test]
    fn firing_never_mutates_the_table() {
        let machine = open_closed_machine();
        let before: Vec<_> = machine
            .event("close")
            .unwrap()
            .transitions()
            .iter()
            .map(|t| (t.from().clone(), t.to().clone()))
            .collect();

        let mut record = TestRecord::valid_in("open");
        machine.fire("close", &mut record).unwrap();

        let after: Vec<_> = machine
            .event("close")
            .unwrap()
            .transitions()
            .iter()
            .map(|t| (t.from().clone(), t.to().clone()))
            .collect();
        assert_eq!(before, after);
    }
}
