//! Periodic dispatch simulation.
//!
//! Each tick moves at most one order from pending to assigned and at most one
//! from assigned to delivered, each with its own probability. Failures are
//! never reported: a step that cannot be applied is skipped for that tick.

use crate::random::RandomSource;
use crate::state::OrderStateMachine;
use dispatch_config::DispatchConfig;
use dispatch_storage::EntityStore;
use dispatch_types::{Order, OrderStatus};
use tracing::debug;

/// Orders changed by one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
	pub assigned: Option<Order>,
	pub delivered: Option<Order>,
}

impl TickOutcome {
	pub fn is_empty(&self) -> bool {
		self.assigned.is_none() && self.delivered.is_none()
	}
}

/// Probabilistic transition engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchSimulator {
	assign_probability: f64,
	deliver_probability: f64,
}

impl DispatchSimulator {
	pub fn new(assign_probability: f64, deliver_probability: f64) -> Self {
		Self {
			assign_probability,
			deliver_probability,
		}
	}

	pub fn from_config(config: &DispatchConfig) -> Self {
		Self::new(config.assign_probability, config.deliver_probability)
	}

	/// Runs one tick against the store.
	///
	/// 1. If any order is pending, with `assign_probability` the first one in
	///    store order is given to a driver picked uniformly from all drivers.
	/// 2. If any order is assigned (after step 1), with `deliver_probability`
	///    the first one in store order is delivered.
	///
	/// A draw is only taken when its step has a candidate order.
	pub fn tick(&self, store: &mut EntityStore, rng: &mut dyn RandomSource) -> TickOutcome {
		TickOutcome {
			assigned: self.assign_step(store, rng),
			delivered: self.deliver_step(store, rng),
		}
	}

	fn assign_step(&self, store: &mut EntityStore, rng: &mut dyn RandomSource) -> Option<Order> {
		let order_id = store.first_with_status(OrderStatus::Pending)?;
		if rng.next_unit() >= self.assign_probability {
			return None;
		}

		let driver_count = store.driver_count();
		if driver_count == 0 {
			debug!(order_id = %order_id, "No drivers available, skipping assignment");
			return None;
		}
		let Some(driver_id) = store
			.drivers()
			.get(rng.pick(driver_count))
			.map(|d| d.id.clone())
		else {
			debug!("Random source picked a driver out of range, skipping assignment");
			return None;
		};

		match OrderStateMachine::assign_driver(store, &order_id, &driver_id) {
			Ok(order) => Some(order),
			Err(e) => {
				debug!(order_id = %order_id, error = %e, "Simulated assignment skipped");
				None
			},
		}
	}

	fn deliver_step(&self, store: &mut EntityStore, rng: &mut dyn RandomSource) -> Option<Order> {
		let order_id = store.first_with_status(OrderStatus::Assigned)?;
		if rng.next_unit() >= self.deliver_probability {
			return None;
		}

		match OrderStateMachine::mark_delivered(store, &order_id) {
			Ok(order) => Some(order),
			Err(e) => {
				debug!(order_id = %order_id, error = %e, "Simulated delivery skipped");
				None
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::{seeded, ScriptedRandom};
	use chrono::Utc;
	use dispatch_config::SeedConfig;
	use dispatch_types::Driver;

	fn reference_store() -> EntityStore {
		EntityStore::from_seed(&SeedConfig::reference()).unwrap()
	}

	fn single_order_store() -> EntityStore {
		let order = Order {
			id: "c1".into(),
			client: "Client A".into(),
			destination: "Marais".into(),
			amount: 25,
			status: OrderStatus::Pending,
			driver_id: None,
			created_at: Utc::now(),
		};
		let driver = Driver {
			id: "d1".into(),
			name: "Alice Dupont".into(),
			region: "Paris".into(),
			rating: 4.8,
			deliveries_count: 156,
			revenue_total: 3420,
		};
		EntityStore::new(vec![order], vec![driver]).unwrap()
	}

	fn assert_invariant(store: &EntityStore) {
		assert!(store.orders().all(Order::is_consistent));
	}

	#[test]
	fn test_certain_assignment_then_stable() {
		let mut store = single_order_store();
		let simulator = DispatchSimulator::new(1.0, 0.0);
		let mut rng = seeded(Some(1));

		let outcome = simulator.tick(&mut store, &mut rng);
		let assigned = outcome.assigned.unwrap();
		assert_eq!(assigned.status, OrderStatus::Assigned);
		assert_eq!(assigned.driver_id.as_deref(), Some("d1"));
		assert!(outcome.delivered.is_none());

		let after_first = store.list_orders();
		for _ in 0..20 {
			assert!(simulator.tick(&mut store, &mut rng).is_empty());
			assert_eq!(store.list_orders(), after_first);
			assert_invariant(&store);
		}
	}

	#[test]
	fn test_picks_first_pending_and_first_assigned() {
		let mut store = reference_store();
		let simulator = DispatchSimulator::new(1.0, 1.0);
		let mut rng = ScriptedRandom::constant(0.0, 3);

		let outcome = simulator.tick(&mut store, &mut rng);

		let assigned = outcome.assigned.unwrap();
		assert_eq!(assigned.id, "c1");
		assert_eq!(assigned.driver_id.as_deref(), Some("d4"));
		// c1 now precedes c2 among assigned orders
		assert_eq!(outcome.delivered.map(|o| o.id), Some("c1".to_string()));
		assert_invariant(&store);
	}

	#[test]
	fn test_draw_above_probability_skips() {
		let mut store = reference_store();
		let before = store.list_orders();
		let simulator = DispatchSimulator::new(0.3, 0.2);
		// 0.7 >= 0.3 and 0.5 >= 0.2: nothing happens
		let mut rng = ScriptedRandom::new(vec![0.7, 0.5], vec![0]);

		assert!(simulator.tick(&mut store, &mut rng).is_empty());
		assert_eq!(store.list_orders(), before);
	}

	#[test]
	fn test_independent_draws_per_step() {
		let mut store = reference_store();
		let simulator = DispatchSimulator::new(0.3, 0.2);
		// assignment misses, delivery hits
		let mut rng = ScriptedRandom::new(vec![0.9, 0.1], vec![0]);

		let outcome = simulator.tick(&mut store, &mut rng);
		assert!(outcome.assigned.is_none());
		assert_eq!(outcome.delivered.map(|o| o.id), Some("c2".to_string()));
	}

	#[test]
	fn test_no_drivers_skips_assignment() {
		let order = single_order_store().list_orders();
		let mut store = EntityStore::new(order, vec![]).unwrap();
		let simulator = DispatchSimulator::new(1.0, 1.0);
		let mut rng = ScriptedRandom::constant(0.0, 0);

		assert!(simulator.tick(&mut store, &mut rng).is_empty());
		assert_eq!(
			store.find_order("c1").map(|o| o.status),
			Some(OrderStatus::Pending)
		);
	}

	#[test]
	fn test_empty_store_is_noop() {
		let mut store = EntityStore::default();
		let simulator = DispatchSimulator::new(1.0, 1.0);
		let mut rng = ScriptedRandom::constant(0.0, 0);

		assert!(simulator.tick(&mut store, &mut rng).is_empty());
	}

	#[test]
	fn test_at_most_one_transition_of_each_kind_per_tick() {
		let mut store = reference_store();
		let simulator = DispatchSimulator::new(1.0, 1.0);
		let mut rng = seeded(Some(99));

		let pending_before = store.orders_by_status(OrderStatus::Pending).len();
		let delivered_before = store.orders_by_status(OrderStatus::Delivered).len();
		simulator.tick(&mut store, &mut rng);

		assert_eq!(
			store.orders_by_status(OrderStatus::Pending).len(),
			pending_before - 1
		);
		assert_eq!(
			store.orders_by_status(OrderStatus::Delivered).len(),
			delivered_before + 1
		);
	}

	#[test]
	fn test_same_seed_reproduces_run() {
		let simulator = DispatchSimulator::new(0.3, 0.2);
		let run = |seed| {
			let mut store = reference_store();
			let mut rng = seeded(Some(seed));
			for _ in 0..50 {
				simulator.tick(&mut store, &mut rng);
				assert_invariant(&store);
			}
			store
				.list_orders()
				.into_iter()
				.map(|o| (o.id, o.status, o.driver_id))
				.collect::<Vec<_>>()
		};

		assert_eq!(run(2024), run(2024));
	}

	#[test]
	fn test_long_run_drains_everything() {
		let mut store = reference_store();
		let simulator = DispatchSimulator::new(1.0, 1.0);
		let mut rng = seeded(Some(5));

		for _ in 0..20 {
			simulator.tick(&mut store, &mut rng);
			assert_invariant(&store);
		}
		assert!(store
			.orders()
			.all(|o| o.status == OrderStatus::Delivered));
	}
}
