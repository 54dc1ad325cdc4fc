//! Order state machine implementation.
//!
//! Orders move through pending -> assigned -> delivered. Every operation
//! checks its preconditions against the current store contents and either
//! commits in full or leaves the store untouched.

use chrono::{DateTime, Utc};
use dispatch_storage::{EntityStore, StoreError};
use dispatch_types::{NewOrder, Order, OrderStatus, MAX_ORDER_AMOUNT};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Kind of entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
	Order,
	Driver,
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntityKind::Order => write!(f, "Order"),
			EntityKind::Driver => write!(f, "Driver"),
		}
	}
}

/// Errors surfaced by the mutation API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
	/// Malformed creation arguments.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
	/// Referenced order or driver does not exist.
	#[error("{kind} not found: {id}")]
	NotFound { kind: EntityKind, id: String },
	/// Requested status change breaks the lifecycle ordering.
	#[error("Invalid state transition for order {order_id} from {from} to {to}")]
	InvalidTransition {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
	},
}

impl From<StoreError> for DispatchError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::OrderNotFound(id) => DispatchError::NotFound {
				kind: EntityKind::Order,
				id,
			},
			StoreError::DriverNotFound(id) => DispatchError::NotFound {
				kind: EntityKind::Driver,
				id,
			},
			other @ (StoreError::Duplicate(_) | StoreError::Inconsistent { .. }) => {
				DispatchError::InvalidInput(other.to_string())
			},
		}
	}
}

/// Validates and applies order mutations against an entity store.
pub struct OrderStateMachine;

impl OrderStateMachine {
	/// Creates a pending order and prepends it to the store.
	pub fn create_order(
		store: &mut EntityStore,
		request: NewOrder,
		now: DateTime<Utc>,
	) -> Result<Order, DispatchError> {
		let amount = u64::try_from(request.amount)
			.ok()
			.filter(|amount| *amount <= MAX_ORDER_AMOUNT)
			.ok_or_else(|| {
				DispatchError::InvalidInput(format!(
					"amount must be between 0 and {}, got {}",
					MAX_ORDER_AMOUNT, request.amount
				))
			})?;
		if request.client.trim().is_empty() {
			return Err(DispatchError::InvalidInput("client cannot be empty".into()));
		}
		if request.destination.trim().is_empty() {
			return Err(DispatchError::InvalidInput(
				"destination cannot be empty".into(),
			));
		}

		let order = Order {
			id: store.next_order_id(),
			client: request.client,
			destination: request.destination,
			amount,
			status: OrderStatus::Pending,
			driver_id: None,
			created_at: now,
		};
		store.insert_order(order.clone())?;
		Ok(order)
	}

	/// Gives a pending order to a driver.
	pub fn assign_driver(
		store: &mut EntityStore,
		order_id: &str,
		driver_id: &str,
	) -> Result<Order, DispatchError> {
		let order = store
			.find_order(order_id)
			.ok_or_else(|| DispatchError::NotFound {
				kind: EntityKind::Order,
				id: order_id.to_string(),
			})?;
		if store.find_driver(driver_id).is_none() {
			return Err(DispatchError::NotFound {
				kind: EntityKind::Driver,
				id: driver_id.to_string(),
			});
		}
		Self::check_transition(&order, OrderStatus::Assigned)?;

		let driver_id = driver_id.to_string();
		Ok(store.update_order_with(order_id, |o| {
			o.status = OrderStatus::Assigned;
			o.driver_id = Some(driver_id);
		})?)
	}

	/// Marks an assigned order as delivered. The driver reference is kept.
	pub fn mark_delivered(store: &mut EntityStore, order_id: &str) -> Result<Order, DispatchError> {
		let order = store
			.find_order(order_id)
			.ok_or_else(|| DispatchError::NotFound {
				kind: EntityKind::Order,
				id: order_id.to_string(),
			})?;
		Self::check_transition(&order, OrderStatus::Delivered)?;

		Ok(store.update_order_with(order_id, |o| {
			o.status = OrderStatus::Delivered;
		})?)
	}

	fn check_transition(order: &Order, to: OrderStatus) -> Result<(), DispatchError> {
		if Self::is_valid_transition(order.status, to) {
			Ok(())
		} else {
			Err(DispatchError::InvalidTransition {
				order_id: order.id.clone(),
				from: order.status,
				to,
			})
		}
	}

	/// Checks if a state transition is valid
	pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		// Each state maps to its allowed next states
		static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
			let mut m = HashMap::new();
			m.insert(
				OrderStatus::Pending,
				HashSet::from([OrderStatus::Assigned]),
			);
			m.insert(
				OrderStatus::Assigned,
				HashSet::from([OrderStatus::Delivered]),
			);
			m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
			m
		});

		TRANSITIONS
			.get(&from)
			.is_some_and(|set| set.contains(&to))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dispatch_config::SeedConfig;

	fn reference_store() -> EntityStore {
		EntityStore::from_seed(&SeedConfig::reference()).unwrap()
	}

	fn request(amount: i64) -> NewOrder {
		NewOrder {
			client: "Client G".into(),
			destination: "Nation".into(),
			amount,
		}
	}

	fn assert_invariant(store: &EntityStore) {
		for order in store.orders() {
			assert!(order.is_consistent(), "order {} broke the invariant", order.id);
		}
	}

	#[test]
	fn test_create_order_is_pending_and_unique() {
		let mut store = reference_store();
		let existing: HashSet<String> = store.orders().map(|o| o.id.clone()).collect();

		let order = OrderStateMachine::create_order(&mut store, request(40), Utc::now()).unwrap();

		assert_eq!(order.status, OrderStatus::Pending);
		assert!(order.driver_id.is_none());
		assert!(!existing.contains(&order.id));
		assert_eq!(store.list_orders()[0], order);
		assert_invariant(&store);
	}

	#[test]
	fn test_create_order_zero_amount_allowed() {
		let mut store = reference_store();
		let order = OrderStateMachine::create_order(&mut store, request(0), Utc::now()).unwrap();
		assert_eq!(order.amount, 0);
	}

	#[test]
	fn test_create_order_negative_amount_rejected() {
		let mut store = reference_store();
		let result = OrderStateMachine::create_order(&mut store, request(-5), Utc::now());

		assert!(matches!(result, Err(DispatchError::InvalidInput(_))));
		assert_eq!(store.order_count(), 6);
	}

	#[test]
	fn test_create_order_amount_cap() {
		let mut store = reference_store();
		let at_cap = request(MAX_ORDER_AMOUNT as i64);
		assert!(OrderStateMachine::create_order(&mut store, at_cap, Utc::now()).is_ok());

		for amount in [MAX_ORDER_AMOUNT as i64 + 1, i64::MAX] {
			let result = OrderStateMachine::create_order(&mut store, request(amount), Utc::now());
			assert!(matches!(result, Err(DispatchError::InvalidInput(_))));
		}
		assert_eq!(store.order_count(), 7);
	}

	#[test]
	fn test_create_order_blank_fields_rejected() {
		let mut store = reference_store();
		let mut blank_client = request(10);
		blank_client.client = " ".into();
		let mut blank_destination = request(10);
		blank_destination.destination = String::new();

		assert!(OrderStateMachine::create_order(&mut store, blank_client, Utc::now()).is_err());
		assert!(
			OrderStateMachine::create_order(&mut store, blank_destination, Utc::now()).is_err()
		);
		assert_eq!(store.order_count(), 6);
	}

	#[test]
	fn test_assign_then_deliver() {
		let mut store = reference_store();

		let assigned = OrderStateMachine::assign_driver(&mut store, "c1", "d4").unwrap();
		assert_eq!(assigned.status, OrderStatus::Assigned);
		assert_eq!(assigned.driver_id.as_deref(), Some("d4"));

		let delivered = OrderStateMachine::mark_delivered(&mut store, "c1").unwrap();
		assert_eq!(delivered.status, OrderStatus::Delivered);
		assert_eq!(delivered.driver_id.as_deref(), Some("d4"));
		assert_invariant(&store);
	}

	#[test]
	fn test_assign_unknown_ids() {
		let mut store = reference_store();

		let err = OrderStateMachine::assign_driver(&mut store, "c99", "d1").unwrap_err();
		assert_eq!(
			err,
			DispatchError::NotFound {
				kind: EntityKind::Order,
				id: "c99".into()
			}
		);

		let err = OrderStateMachine::assign_driver(&mut store, "c1", "d99").unwrap_err();
		assert_eq!(
			err,
			DispatchError::NotFound {
				kind: EntityKind::Driver,
				id: "d99".into()
			}
		);
		assert_eq!(
			store.find_order("c1").map(|o| o.status),
			Some(OrderStatus::Pending)
		);
	}

	#[test]
	fn test_assign_non_pending_rejected_without_change() {
		let mut store = reference_store();
		let before = store.list_orders();

		for id in ["c2", "c3"] {
			let err = OrderStateMachine::assign_driver(&mut store, id, "d5").unwrap_err();
			assert!(matches!(err, DispatchError::InvalidTransition { .. }));
		}
		assert_eq!(store.list_orders(), before);
	}

	#[test]
	fn test_assign_twice_rejected() {
		let mut store = reference_store();
		OrderStateMachine::assign_driver(&mut store, "c4", "d2").unwrap();

		let err = OrderStateMachine::assign_driver(&mut store, "c4", "d3").unwrap_err();
		assert_eq!(
			err,
			DispatchError::InvalidTransition {
				order_id: "c4".into(),
				from: OrderStatus::Assigned,
				to: OrderStatus::Assigned,
			}
		);
		assert_eq!(
			store.find_order("c4").and_then(|o| o.driver_id),
			Some("d2".to_string())
		);
	}

	#[test]
	fn test_deliver_non_assigned_rejected() {
		let mut store = reference_store();

		for id in ["c1", "c3"] {
			let err = OrderStateMachine::mark_delivered(&mut store, id).unwrap_err();
			assert!(matches!(err, DispatchError::InvalidTransition { .. }));
		}
		let err = OrderStateMachine::mark_delivered(&mut store, "c77").unwrap_err();
		assert!(matches!(err, DispatchError::NotFound { .. }));
	}

	#[test]
	fn test_transition_table() {
		use OrderStatus::*;

		assert!(OrderStateMachine::is_valid_transition(Pending, Assigned));
		assert!(OrderStateMachine::is_valid_transition(Assigned, Delivered));
		assert!(!OrderStateMachine::is_valid_transition(Pending, Delivered));
		assert!(!OrderStateMachine::is_valid_transition(Assigned, Assigned));
		assert!(!OrderStateMachine::is_valid_transition(Delivered, Pending));
		assert!(!OrderStateMachine::is_valid_transition(Delivered, Assigned));
	}
}
