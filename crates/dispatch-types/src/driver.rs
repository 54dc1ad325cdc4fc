//! Driver types for the dispatch system.

use serde::{Deserialize, Serialize};

/// Upper bound of the driver rating scale.
pub const MAX_RATING: f64 = 5.0;

/// A delivery driver.
///
/// Rating and the cumulative counters are seeded at startup and are not
/// changed by order transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
	/// Unique identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Operating region.
	pub region: String,
	/// Customer rating in `0.0..=5.0`.
	pub rating: f64,
	/// Number of completed deliveries.
	pub deliveries_count: u64,
	/// Revenue generated, in currency units.
	pub revenue_total: u64,
}

/// Number of orders currently assigned to one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverWorkload {
	pub driver_id: String,
	pub in_progress: usize,
}

/// Activity of one operating region, derived from its drivers and their orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
	pub region: String,
	/// Drivers operating in the region.
	pub drivers: usize,
	/// Assigned or delivered orders handled by those drivers.
	pub orders: usize,
	/// Sum of those orders' amounts.
	pub revenue: u64,
	/// Mean rating of the region's drivers.
	pub average_rating: f64,
}
