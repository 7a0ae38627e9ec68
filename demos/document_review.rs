//! Document Review
//!
//! This example demonstrates multi-source transitions and validation
//! scoping.
//!
//! Key concepts:
//! - One declaration fanning out over several source states (`from_any`)
//! - Declaration order deciding between competing transitions
//! - Validation rules scoped to a state or to one transition, installed
//!   through a registrar the engine never evaluates
//!
//! Run with: cargo run --example document_review

use statebound::{
    EventBuilder, EventId, MachineBuilder, Record, StateBuilder, StateId, TransitionBuilder,
    ValidationRegistrar, ValidationRule,
};

struct Document {
    body: String,
    state: Option<StateId>,
    active: Option<EventId>,
}

impl Record for Document {
    fn current_state(&self) -> Option<StateId> {
        self.state.clone()
    }

    fn set_current_state(&mut self, state: &StateId) {
        self.state = Some(state.clone());
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn eval_named_guard(&self, name: &str) -> bool {
        matches!(name, "has_body" if !self.body.is_empty())
    }

    fn active_event(&self) -> Option<EventId> {
        self.active.clone()
    }

    fn set_active_event(&mut self, event: Option<EventId>) {
        self.active = event;
    }
}

#[derive(Default)]
struct RuleBook {
    rules: Vec<ValidationRule<Document>>,
}

impl ValidationRegistrar<Document> for RuleBook {
    fn register(&mut self, rule: ValidationRule<Document>) {
        self.rules.push(rule);
    }
}

fn main() {
    println!("=== Document Review ===\n");

    let mut rules = RuleBook::default();

    let machine = MachineBuilder::<Document>::new()
        .initial("draft")
        .state(StateBuilder::new("draft"))
        .state(StateBuilder::new("review"))
        .state(StateBuilder::new("published"))
        .state(StateBuilder::new("archived"))
        .event(
            EventBuilder::new("submit").transition_scoped(
                TransitionBuilder::new()
                    .from("draft")
                    .to("review")
                    .when(|d: &Document| d.eval_named_guard("has_body")),
                |scope| {
                    scope.install(
                        &mut rules,
                        ValidationRule::new("body_present")
                            .with_args(serde_json::json!({ "field": "body" })),
                    );
                },
            ),
        )
        .event(
            EventBuilder::new("publish")
                .transition(TransitionBuilder::new().from("review").to("published")),
        )
        .event(
            EventBuilder::new("archive").transition(
                TransitionBuilder::new()
                    .from_any(["draft", "review", "published"])
                    .to("archived"),
            ),
        )
        .build()
        .expect("definition is well-formed");

    println!(
        "installed rules: {:?}",
        rules.rules.iter().map(|r| r.name()).collect::<Vec<_>>()
    );

    let mut doc = Document {
        body: String::new(),
        state: None,
        active: None,
    };
    machine.initialize_record(&mut doc);

    // The scoped rule only applies while `submit` fires out of `draft`;
    // at rest it stays dormant.
    let rule = &rules.rules[0];
    println!("rule active at rest: {}", rule.applies_to(&doc));

    let fired = machine.fire("submit", &mut doc).unwrap();
    println!("submit with empty body -> fired: {fired}");

    doc.body = "Quarterly report".to_string();
    let fired = machine.fire("submit", &mut doc).unwrap();
    println!("submit with a body -> fired: {fired}, now: {}", doc.state.clone().unwrap());

    machine.fire("publish", &mut doc).unwrap();
    println!("publish -> now: {}", doc.state.clone().unwrap());

    // archive accepts any of its three sources; this record is published.
    machine.fire("archive", &mut doc).unwrap();
    println!("archive -> now: {}", doc.state.clone().unwrap());

    let filter = machine.in_state_filter(["archived"]).unwrap();
    println!(
        "\nexternal query hint: {} IN {:?}",
        filter.column(),
        filter
            .states()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
    );
}
