//! Storage module for the dispatch dashboard.
//!
//! The entity store is the single source of truth for orders and drivers.
//! Readers get cloned snapshots; every change goes through a named
//! operation so that the order/driver invariant cannot be bypassed.
//! The store itself is not synchronised: callers that share it across
//! tasks wrap it in a lock and hold that lock for a whole operation.

use chrono::Utc;
use dispatch_config::SeedConfig;
use dispatch_types::{Driver, Order, OrderStatus};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
	/// No order with this ID.
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	/// No driver with this ID.
	#[error("Driver not found: {0}")]
	DriverNotFound(String),
	/// An entity with this ID already exists.
	#[error("Duplicate ID: {0}")]
	Duplicate(String),
	/// A write would break the order/driver invariant.
	#[error("Inconsistent order {id}: {reason}")]
	Inconsistent { id: String, reason: String },
}

/// In-memory store of orders and drivers.
///
/// Orders are kept most-recent-first: new orders are prepended, and
/// `list_orders` returns them in that order. Drivers keep seed order.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
	orders: VecDeque<Order>,
	drivers: Vec<Driver>,
	/// Next candidate suffix for generated order IDs.
	next_sequence: u64,
}

impl EntityStore {
	/// Creates a store from already-built entities.
	///
	/// Rejects duplicate IDs, orders that break the driver invariant and
	/// orders that reference an unknown driver.
	pub fn new(orders: Vec<Order>, drivers: Vec<Driver>) -> Result<Self, StoreError> {
		let mut driver_ids = HashSet::new();
		for driver in &drivers {
			if !driver_ids.insert(driver.id.as_str()) {
				return Err(StoreError::Duplicate(driver.id.clone()));
			}
		}

		let mut order_ids = HashSet::new();
		for order in &orders {
			if !order_ids.insert(order.id.as_str()) {
				return Err(StoreError::Duplicate(order.id.clone()));
			}
			check_consistency(order)?;
			if let Some(driver_id) = &order.driver_id {
				if !driver_ids.contains(driver_id.as_str()) {
					return Err(StoreError::DriverNotFound(driver_id.clone()));
				}
			}
		}

		let next_sequence = orders.len() as u64 + 1;
		tracing::debug!(
			orders = orders.len(),
			drivers = drivers.len(),
			"Entity store initialised"
		);

		Ok(Self {
			orders: orders.into(),
			drivers,
			next_sequence,
		})
	}

	/// Creates a store from configured seed data.
	pub fn from_seed(seed: &SeedConfig) -> Result<Self, StoreError> {
		let loaded_at = Utc::now();
		let orders = seed.orders.iter().map(|o| o.to_order(loaded_at)).collect();
		let drivers = seed.drivers.iter().map(|d| d.to_driver()).collect();
		Self::new(orders, drivers)
	}

	/// Snapshot of all orders, most recent first.
	pub fn list_orders(&self) -> Vec<Order> {
		self.orders.iter().cloned().collect()
	}

	/// Snapshot of all drivers, in seed order.
	pub fn list_drivers(&self) -> Vec<Driver> {
		self.drivers.clone()
	}

	/// Read-only iteration over orders in store order.
	pub fn orders(&self) -> impl Iterator<Item = &Order> {
		self.orders.iter()
	}

	/// Read-only view of the drivers in seed order.
	pub fn drivers(&self) -> &[Driver] {
		&self.drivers
	}

	/// Looks up an order by ID.
	pub fn find_order(&self, id: &str) -> Option<Order> {
		self.orders.iter().find(|o| o.id == id).cloned()
	}

	/// Looks up a driver by ID.
	pub fn find_driver(&self, id: &str) -> Option<Driver> {
		self.drivers.iter().find(|d| d.id == id).cloned()
	}

	/// Orders with the given status, in store order.
	pub fn orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
		self.orders
			.iter()
			.filter(|o| o.status == status)
			.cloned()
			.collect()
	}

	/// ID of the first order in store order with the given status.
	pub fn first_with_status(&self, status: OrderStatus) -> Option<String> {
		self.orders
			.iter()
			.find(|o| o.status == status)
			.map(|o| o.id.clone())
	}

	pub fn order_count(&self) -> usize {
		self.orders.len()
	}

	pub fn driver_count(&self) -> usize {
		self.drivers.len()
	}

	/// Allocates an order ID of the form `c<n>` not used by any stored order.
	pub fn next_order_id(&mut self) -> String {
		loop {
			let candidate = format!("c{}", self.next_sequence);
			self.next_sequence += 1;
			if !self.orders.iter().any(|o| o.id == candidate) {
				return candidate;
			}
		}
	}

	/// Prepends a new order.
	pub fn insert_order(&mut self, order: Order) -> Result<(), StoreError> {
		if self.orders.iter().any(|o| o.id == order.id) {
			return Err(StoreError::Duplicate(order.id));
		}
		check_consistency(&order)?;
		if let Some(driver_id) = &order.driver_id {
			if self.find_driver(driver_id).is_none() {
				return Err(StoreError::DriverNotFound(driver_id.clone()));
			}
		}
		self.orders.push_front(order);
		Ok(())
	}

	/// Applies `updater` to a copy of the order and commits it only if the
	/// result still satisfies the invariant. Returns the committed order.
	pub fn update_order_with<F>(&mut self, id: &str, updater: F) -> Result<Order, StoreError>
	where
		F: FnOnce(&mut Order),
	{
		let slot = self
			.orders
			.iter_mut()
			.find(|o| o.id == id)
			.ok_or_else(|| StoreError::OrderNotFound(id.to_string()))?;

		let mut updated = slot.clone();
		updater(&mut updated);

		if updated.id != slot.id {
			return Err(StoreError::Inconsistent {
				id: id.to_string(),
				reason: "order ID cannot change".into(),
			});
		}
		if slot.driver_id.is_some() && updated.driver_id != slot.driver_id {
			return Err(StoreError::Inconsistent {
				id: id.to_string(),
				reason: "driver cannot be changed once set".into(),
			});
		}
		check_consistency(&updated)?;

		*slot = updated.clone();
		Ok(updated)
	}
}

fn check_consistency(order: &Order) -> Result<(), StoreError> {
	if order.is_consistent() {
		return Ok(());
	}
	let reason = if order.driver_id.is_some() {
		"pending order cannot reference a driver"
	} else {
		"assigned or delivered order must reference a driver"
	};
	Err(StoreError::Inconsistent {
		id: order.id.clone(),
		reason: reason.into(),
	})
}
