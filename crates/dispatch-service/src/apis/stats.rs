//! Dashboard summary endpoint.

use dispatch_core::DispatchEngine;
use dispatch_types::DashboardStats;

pub async fn get_stats(engine: &DispatchEngine) -> DashboardStats {
	engine.stats().await
}
