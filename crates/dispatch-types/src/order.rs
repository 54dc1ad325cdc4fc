//! Order types for the dispatch system.
//!
//! An order moves through a fixed lifecycle (pending -> assigned -> delivered).
//! The driver reference is set once, on assignment, and kept through delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest order amount accepted, in currency units.
pub const MAX_ORDER_AMOUNT: u64 = 1_000_000;

/// A customer order tracked by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier, stable for the lifetime of the order.
	pub id: String,
	/// Display name of the client.
	pub client: String,
	/// Free-text delivery location.
	pub destination: String,
	/// Order value in currency units.
	pub amount: u64,
	/// Current lifecycle state.
	pub status: OrderStatus,
	/// Driver that took the order. Present iff `status != Pending`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub driver_id: Option<String>,
	/// Creation timestamp, used for display ordering.
	pub created_at: DateTime<Utc>,
}

impl Order {
	/// Returns true when the driver reference agrees with the status.
	pub fn is_consistent(&self) -> bool {
		self.driver_id.is_some() == self.status.requires_driver()
	}
}

/// Parameters for creating a new order.
///
/// The amount is signed so that negative requests can be rejected explicitly
/// instead of failing at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
	pub client: String,
	pub destination: String,
	pub amount: i64,
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Waiting for a driver.
	Pending,
	/// Taken by a driver, on its way.
	Assigned,
	/// Handed over to the client. Terminal.
	Delivered,
}

impl OrderStatus {
	/// Returns the string representation used in configuration and query strings.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Assigned => "assigned",
			OrderStatus::Delivered => "delivered",
		}
	}

	/// Whether an order in this state must reference a driver.
	pub fn requires_driver(&self) -> bool {
		!matches!(self, OrderStatus::Pending)
	}

	/// Returns an iterator over all statuses in lifecycle order.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Pending, Self::Assigned, Self::Delivered].into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
	type Err = ParseStatusError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(Self::Pending),
			"assigned" => Ok(Self::Assigned),
			"delivered" => Ok(Self::Delivered),
			other => Err(ParseStatusError(other.to_string())),
		}
	}
}
