//! Dashboard statistics.

use serde::{Deserialize, Serialize};

/// Summary metrics derived from the current store contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
	/// Number of orders, whatever their status.
	pub total_orders: usize,
	/// Drivers with at least one completed delivery.
	pub active_drivers: usize,
	/// Orders still waiting for a driver.
	pub pending_orders: usize,
	/// Sum of all order amounts, whatever their status.
	pub total_revenue: u64,
}
