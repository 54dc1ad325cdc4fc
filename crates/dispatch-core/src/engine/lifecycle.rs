//! Startup and shutdown hooks for the dispatch engine.

use super::DispatchEngine;

impl DispatchEngine {
	/// Logs the state the engine starts from.
	pub async fn initialize(&self) {
		let stats = self.stats().await;
		tracing::info!(
			dashboard = %self.config.dashboard.id,
			orders = stats.total_orders,
			pending = stats.pending_orders,
			drivers = self.list_drivers().await.len(),
			"Initializing dispatch engine"
		);
	}

	/// Logs the state the engine stops in.
	pub async fn shutdown(&self) {
		let stats = self.stats().await;
		tracing::info!(
			orders = stats.total_orders,
			pending = stats.pending_orders,
			revenue = %dispatch_types::format_amount(stats.total_revenue),
			"Shutting down dispatch engine"
		);
	}
}
