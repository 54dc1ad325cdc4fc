//! Driver rankings and driver-centric views derived from the store.

use dispatch_storage::EntityStore;
use dispatch_types::{Driver, DriverWorkload, OrderStatus, RegionSummary};
use std::collections::HashMap;

/// Drivers sorted by revenue, highest first. Ties keep seed order.
pub fn rank_drivers(drivers: &[Driver]) -> Vec<Driver> {
	let mut ranked = drivers.to_vec();
	// sort_by is stable
	ranked.sort_by(|a, b| b.revenue_total.cmp(&a.revenue_total));
	ranked
}

/// Drivers rated at least `min_rating`, best rated first. Ties keep seed order.
pub fn top_drivers_by_rating(drivers: &[Driver], min_rating: f64) -> Vec<Driver> {
	let mut top: Vec<Driver> = drivers
		.iter()
		.filter(|d| d.rating >= min_rating)
		.cloned()
		.collect();
	top.sort_by(|a, b| b.rating.total_cmp(&a.rating));
	top
}

/// Number of assigned (not yet delivered) orders per driver, in seed order.
pub fn driver_workload(store: &EntityStore) -> Vec<DriverWorkload> {
	store
		.drivers()
		.iter()
		.map(|driver| DriverWorkload {
			driver_id: driver.id.clone(),
			in_progress: store
				.orders()
				.filter(|o| {
					o.status == OrderStatus::Assigned
						&& o.driver_id.as_deref() == Some(driver.id.as_str())
				})
				.count(),
		})
		.collect()
}

/// Drivers operating in `region`, in seed order. Region names match
/// ignoring ASCII case.
pub fn drivers_in_region(drivers: &[Driver], region: &str) -> Vec<Driver> {
	let region = region.trim();
	drivers
		.iter()
		.filter(|d| d.region.eq_ignore_ascii_case(region))
		.cloned()
		.collect()
}

/// Per-region driver count, handled orders and revenue, highest revenue
/// first. Regions with equal revenue keep the order in which their first
/// driver was seeded. Pending orders belong to no region yet.
pub fn region_summary(store: &EntityStore) -> Vec<RegionSummary> {
	let mut summaries: Vec<RegionSummary> = Vec::new();
	let mut rating_sums: Vec<f64> = Vec::new();
	let mut region_of_driver: HashMap<&str, usize> = HashMap::new();

	for driver in store.drivers() {
		let index = match summaries.iter().position(|s| s.region == driver.region) {
			Some(index) => index,
			None => {
				summaries.push(RegionSummary {
					region: driver.region.clone(),
					drivers: 0,
					orders: 0,
					revenue: 0,
					average_rating: 0.0,
				});
				rating_sums.push(0.0);
				summaries.len() - 1
			},
		};
		summaries[index].drivers += 1;
		rating_sums[index] += driver.rating;
		region_of_driver.insert(driver.id.as_str(), index);
	}

	for order in store.orders() {
		let Some(index) = order
			.driver_id
			.as_deref()
			.and_then(|id| region_of_driver.get(id))
		else {
			continue;
		};
		let summary = &mut summaries[*index];
		summary.orders += 1;
		summary.revenue = summary.revenue.saturating_add(order.amount);
	}

	for (summary, rating_sum) in summaries.iter_mut().zip(rating_sums) {
		summary.average_rating = rating_sum / summary.drivers as f64;
	}

	summaries.sort_by(|a, b| b.revenue.cmp(&a.revenue));
	summaries
}
