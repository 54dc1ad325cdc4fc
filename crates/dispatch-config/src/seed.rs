//! Seed data loaded into the entity store at startup.

use crate::ConfigError;
use chrono::{DateTime, Utc};
use dispatch_types::{Driver, Order, OrderStatus, MAX_ORDER_AMOUNT, MAX_RATING};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Initial orders and drivers.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedConfig {
	#[serde(default)]
	pub drivers: Vec<SeedDriver>,
	#[serde(default)]
	pub orders: Vec<SeedOrder>,
}

/// A driver as written in the configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedDriver {
	pub id: String,
	pub name: String,
	pub region: String,
	pub rating: f64,
	#[serde(default)]
	pub deliveries: u64,
	#[serde(default)]
	pub revenue: u64,
}

/// An order as written in the configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedOrder {
	pub id: String,
	pub client: String,
	pub destination: String,
	pub amount: u64,
	#[serde(default = "default_status")]
	pub status: OrderStatus,
	/// Required unless the order is pending.
	#[serde(default)]
	pub driver: Option<String>,
	/// Defaults to the load time.
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
}

fn default_status() -> OrderStatus {
	OrderStatus::Pending
}

impl SeedDriver {
	fn new(id: &str, name: &str, region: &str, rating: f64, deliveries: u64, revenue: u64) -> Self {
		Self {
			id: id.to_string(),
			name: name.to_string(),
			region: region.to_string(),
			rating,
			deliveries,
			revenue,
		}
	}

	pub fn to_driver(&self) -> Driver {
		Driver {
			id: self.id.clone(),
			name: self.name.clone(),
			region: self.region.clone(),
			rating: self.rating,
			deliveries_count: self.deliveries,
			revenue_total: self.revenue,
		}
	}
}

impl SeedOrder {
	fn new(
		id: &str,
		client: &str,
		destination: &str,
		amount: u64,
		status: OrderStatus,
		driver: Option<&str>,
	) -> Self {
		Self {
			id: id.to_string(),
			client: client.to_string(),
			destination: destination.to_string(),
			amount,
			status,
			driver: driver.map(str::to_string),
			created_at: None,
		}
	}

	/// Builds the order, stamping `loaded_at` when no creation time was configured.
	pub fn to_order(&self, loaded_at: DateTime<Utc>) -> Order {
		Order {
			id: self.id.clone(),
			client: self.client.clone(),
			destination: self.destination.clone(),
			amount: self.amount,
			status: self.status,
			driver_id: self.driver.clone(),
			created_at: self.created_at.unwrap_or(loaded_at),
		}
	}
}

impl SeedConfig {
	/// The reference data set: six orders across the lifecycle and five drivers.
	///
	/// Order `c3` is delivered, so it carries the driver that completed it.
	pub fn reference() -> Self {
		use OrderStatus::*;

		Self {
			drivers: vec![
				SeedDriver::new("d1", "Alice Dupont", "Paris", 4.8, 156, 3420),
				SeedDriver::new("d2", "Bob Martin", "Paris", 4.5, 142, 3180),
				SeedDriver::new("d3", "Charlie Lefevre", "Banlieue", 4.9, 178, 3890),
				SeedDriver::new("d4", "Diana Russo", "Banlieue", 4.3, 98, 2140),
				SeedDriver::new("d5", "Emma Laurent", "Paris", 4.7, 134, 2980),
			],
			orders: vec![
				SeedOrder::new("c1", "Client A", "Marais", 25, Pending, None),
				SeedOrder::new("c2", "Client B", "Belleville", 15, Assigned, Some("d1")),
				SeedOrder::new("c3", "Client C", "Bercy", 30, Delivered, Some("d3")),
				SeedOrder::new("c4", "Client D", "Auteuil", 20, Pending, None),
				SeedOrder::new("c5", "Client E", "Montmartre", 18, Assigned, Some("d2")),
				SeedOrder::new("c6", "Client F", "Bastille", 22, Pending, None),
			],
		}
	}

	/// Checks identifiers, rating bounds and the order/driver invariant.
	pub(crate) fn validate(&self) -> Result<(), ConfigError> {
		let mut driver_ids = HashSet::new();
		for driver in &self.drivers {
			if driver.id.trim().is_empty() {
				return Err(ConfigError::Validation("Driver ID cannot be empty".into()));
			}
			if !driver_ids.insert(driver.id.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate driver ID '{}'",
					driver.id
				)));
			}
			if !(0.0..=MAX_RATING).contains(&driver.rating) {
				return Err(ConfigError::Validation(format!(
					"Driver '{}' rating {} is outside 0.0..={}",
					driver.id, driver.rating, MAX_RATING
				)));
			}
		}

		let mut order_ids = HashSet::new();
		for order in &self.orders {
			if order.id.trim().is_empty() {
				return Err(ConfigError::Validation("Order ID cannot be empty".into()));
			}
			if !order_ids.insert(order.id.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate order ID '{}'",
					order.id
				)));
			}
			if order.amount > MAX_ORDER_AMOUNT {
				return Err(ConfigError::Validation(format!(
					"Order '{}' amount {} exceeds {}",
					order.id, order.amount, MAX_ORDER_AMOUNT
				)));
			}
			match (&order.driver, order.status.requires_driver()) {
				(None, true) => {
					return Err(ConfigError::Validation(format!(
						"Order '{}' is {} but has no driver",
						order.id, order.status
					)));
				},
				(Some(driver), false) => {
					return Err(ConfigError::Validation(format!(
						"Order '{}' is pending but references driver '{}'",
						order.id, driver
					)));
				},
				(Some(driver), true) if !driver_ids.contains(driver.as_str()) => {
					return Err(ConfigError::Validation(format!(
						"Order '{}' references unknown driver '{}'",
						order.id, driver
					)));
				},
				_ => {},
			}
		}

		Ok(())
	}
}
