//! Order Lifecycle
//!
//! This example demonstrates the full firing protocol against a simple
//! in-memory record.
//!
//! Key concepts:
//! - Named lifecycle actions dispatched through the record adapter
//! - Guards conjoined with record validity
//! - State timestamps written on every exit of a state
//! - Loopback transitions (commit without callbacks)
//!
//! Run with: cargo run --example order_lifecycle

use chrono::{DateTime, Utc};
use statebound::{
    Action, ActionError, EventBuilder, Guard, MachineBuilder, Record, StateBuilder, StateId,
    TransitionBuilder,
};
use std::collections::BTreeMap;

struct Order {
    id: u64,
    paid: bool,
    state: Option<StateId>,
    log: Vec<String>,
    timestamps: BTreeMap<String, DateTime<Utc>>,
}

impl Record for Order {
    fn current_state(&self) -> Option<StateId> {
        self.state.clone()
    }

    fn set_current_state(&mut self, state: &StateId) {
        self.state = Some(state.clone());
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn run_named_action(&mut self, name: &str) -> Result<(), ActionError> {
        match name {
            "notify_warehouse" => {
                self.log.push(format!("warehouse notified for order {}", self.id));
                Ok(())
            }
            other => Err(format!("order has no action named '{other}'").into()),
        }
    }

    fn eval_named_guard(&self, name: &str) -> bool {
        matches!(name, "paid" if self.paid)
    }

    fn write_timestamp_if_absent(&mut self, field: &str, at: DateTime<Utc>) {
        self.timestamps.entry(field.to_string()).or_insert(at);
    }

    fn write_timestamp_always(&mut self, field: &str, at: DateTime<Utc>) {
        self.timestamps.insert(field.to_string(), at);
    }
}

fn main() {
    println!("=== Order Lifecycle ===\n");

    let machine = MachineBuilder::<Order>::new()
        .initial("open")
        .state(StateBuilder::new("open"))
        .state(
            StateBuilder::new("packed")
                .on_entered(Action::method("notify_warehouse")),
        )
        .state(StateBuilder::new("shipped").on_enter(Action::new(|o: &mut Order| {
            o.log.push("shipping label printed".to_string());
        })))
        .event(
            EventBuilder::new("pack").transition(
                TransitionBuilder::new()
                    .from("open")
                    .to("packed")
                    .guard(Guard::method("paid")),
            ),
        )
        .event(
            EventBuilder::new("ship")
                .transition(TransitionBuilder::new().from("packed").to("shipped")),
        )
        .event(
            EventBuilder::new("repack")
                .transition(TransitionBuilder::new().from("packed").to("packed")),
        )
        .build()
        .expect("definition is well-formed");

    let mut order = Order {
        id: 4711,
        paid: false,
        state: None,
        log: Vec::new(),
        timestamps: BTreeMap::new(),
    };
    machine.initialize_record(&mut order);
    println!("order starts in: {}", order.state.clone().unwrap());

    // Unpaid: the guard rejects, nothing fires, state is unchanged.
    let fired = machine.fire("pack", &mut order).unwrap();
    println!("pack while unpaid -> fired: {fired}");

    order.paid = true;
    let fired = machine.fire("pack", &mut order).unwrap();
    println!("pack after payment -> fired: {fired}, now: {}", order.state.clone().unwrap());

    // Loopback: commits (and stamps packed_updated_at) without callbacks.
    let log_before = order.log.len();
    machine.fire("repack", &mut order).unwrap();
    println!(
        "repack loopback -> callbacks run: {}",
        order.log.len() - log_before
    );

    machine.fire("ship", &mut order).unwrap();
    println!("ship -> now: {}\n", order.state.clone().unwrap());

    println!("action log:");
    for entry in &order.log {
        println!("  - {entry}");
    }

    println!("\nstate timestamps:");
    for (field, at) in &order.timestamps {
        println!("  {field}: {at}");
    }
}
