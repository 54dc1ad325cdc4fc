//! Dashboard statistics, recomputed from the store on every call.

use dispatch_storage::EntityStore;
use dispatch_types::{DashboardStats, OrderStatus};

/// Derives the summary metrics from the current store contents.
pub fn compute_stats(store: &EntityStore) -> DashboardStats {
	let mut stats = DashboardStats {
		active_drivers: store
			.drivers()
			.iter()
			.filter(|d| d.deliveries_count > 0)
			.count(),
		..DashboardStats::default()
	};

	for order in store.orders() {
		stats.total_orders += 1;
		stats.total_revenue = stats.total_revenue.saturating_add(order.amount);
		if order.status == OrderStatus::Pending {
			stats.pending_orders += 1;
		}
	}

	stats
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::OrderStateMachine;
	use chrono::Utc;
	use dispatch_config::SeedConfig;
	use dispatch_types::{NewOrder, Order};

	fn reference_store() -> EntityStore {
		EntityStore::from_seed(&SeedConfig::reference()).unwrap()
	}

	#[test]
	fn test_reference_stats() {
		let stats = compute_stats(&reference_store());

		assert_eq!(
			stats,
			DashboardStats {
				total_orders: 6,
				active_drivers: 5,
				pending_orders: 3,
				total_revenue: 130,
			}
		);
	}

	#[test]
	fn test_stats_are_idempotent() {
		let store = reference_store();
		assert_eq!(compute_stats(&store), compute_stats(&store));
	}

	#[test]
	fn test_revenue_counts_every_status() {
		let mut store = reference_store();
		OrderStateMachine::assign_driver(&mut store, "c1", "d1").unwrap();
		OrderStateMachine::mark_delivered(&mut store, "c1").unwrap();

		let stats = compute_stats(&store);
		assert_eq!(stats.total_revenue, 130);
		assert_eq!(stats.pending_orders, 2);
	}

	#[test]
	fn test_stats_follow_mutations() {
		let mut store = reference_store();
		OrderStateMachine::create_order(
			&mut store,
			NewOrder {
				client: "Client G".into(),
				destination: "Bercy".into(),
				amount: 17,
			},
			Utc::now(),
		)
		.unwrap();

		let stats = compute_stats(&store);
		assert_eq!(stats.total_orders, 7);
		assert_eq!(stats.pending_orders, 4);
		assert_eq!(stats.total_revenue, 147);
	}

	#[test]
	fn test_drivers_without_deliveries_are_inactive() {
		let mut seed = SeedConfig::reference();
		seed.drivers[4].deliveries = 0;
		let store = EntityStore::from_seed(&seed).unwrap();

		assert_eq!(compute_stats(&store).active_drivers, 4);
	}

	#[test]
	fn test_revenue_saturates_instead_of_overflowing() {
		let orders = (1..=3)
			.map(|n| Order {
				id: format!("c{}", n),
				client: format!("Client {}", n),
				destination: "Bercy".into(),
				amount: i64::MAX as u64,
				status: OrderStatus::Pending,
				driver_id: None,
				created_at: Utc::now(),
			})
			.collect();
		let store = EntityStore::new(orders, Vec::new()).unwrap();

		let stats = compute_stats(&store);
		assert_eq!(stats.total_orders, 3);
		assert_eq!(stats.total_revenue, u64::MAX);
	}

	#[test]
	fn test_empty_store() {
		assert_eq!(
			compute_stats(&EntityStore::default()),
			DashboardStats::default()
		);
	}
}
