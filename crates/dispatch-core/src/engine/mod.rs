//! Dispatch engine: the single owner of the entity store at runtime.
//!
//! All mutation API calls and all simulation ticks go through the engine.
//! Each one takes the store lock for its whole check-then-commit step, so
//! a timer tick and a user request touching the same order are always
//! applied one after the other. Events are published while the lock is
//! still held, which keeps event order equal to commit order.

pub mod lifecycle;

use crate::event_bus::EventBus;
use crate::generator::OrderGenerator;
use crate::random::RandomSource;
use crate::ranking;
use crate::simulation::{DispatchSimulator, TickOutcome};
use crate::state::{DispatchError, OrderStateMachine};
use crate::stats;
use chrono::Utc;
use dispatch_config::Config;
use dispatch_storage::EntityStore;
use dispatch_types::{
	DashboardStats, DispatchEvent, Driver, DriverWorkload, EventSource, NewOrder, Order,
	OrderStatus, RegionSummary,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::instrument;

/// Errors that can occur while building or running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Store and random source, guarded together so that a tick sees a
/// consistent pair.
struct DispatchState {
	store: EntityStore,
	rng: Box<dyn RandomSource>,
}

/// Runtime handle over the dispatch state.
#[derive(Clone)]
pub struct DispatchEngine {
	/// Dashboard configuration.
	config: Config,
	/// Shared store and random source.
	state: Arc<Mutex<DispatchState>>,
	/// Periodic transition rules.
	simulator: DispatchSimulator,
	/// Source of simulated incoming orders.
	generator: OrderGenerator,
	/// Event bus for change notifications.
	event_bus: EventBus,
}

impl DispatchEngine {
	/// Creates an engine over an already-populated store.
	pub fn new(
		config: Config,
		store: EntityStore,
		rng: Box<dyn RandomSource>,
		event_bus: EventBus,
	) -> Self {
		let simulator = DispatchSimulator::from_config(&config.dispatch);
		Self {
			config,
			state: Arc::new(Mutex::new(DispatchState { store, rng })),
			simulator,
			generator: OrderGenerator::default(),
			event_bus,
		}
	}

	/// Runs the periodic simulation until Ctrl-C is received.
	pub async fn run(&self) {
		self.run_until(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::error!("Failed to listen for shutdown signal: {}", e);
				std::future::pending::<()>().await;
			}
		})
		.await;
	}

	/// Runs the periodic simulation until `shutdown` resolves.
	///
	/// The first tick fires one interval after start. A tick can only be
	/// interrupted while waiting for the store lock, before it has changed
	/// anything.
	pub async fn run_until<F>(&self, shutdown: F)
	where
		F: Future<Output = ()>,
	{
		let period = Duration::from_secs(self.config.dispatch.tick_interval_seconds);
		let mut interval = tokio::time::interval(period);
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
		// The first tick of a tokio interval completes immediately
		interval.tick().await;

		tokio::pin!(shutdown);
		tracing::info!(
			interval_seconds = period.as_secs(),
			"Dispatch simulation started"
		);

		loop {
			tokio::select! {
				_ = interval.tick() => {
					self.tick().await;
				}
				_ = &mut shutdown => {
					break;
				}
			}
		}

		tracing::info!("Dispatch simulation stopped");
	}

	/// Applies one simulation tick and publishes the resulting events.
	pub async fn tick(&self) -> TickOutcome {
		let mut guard = self.state.lock().await;
		let DispatchState { store, rng } = &mut *guard;

		let outcome = self.simulator.tick(store, rng.as_mut());

		if let Some(order) = &outcome.assigned {
			tracing::info!(
				order_id = %order.id,
				driver_id = order.driver_id.as_deref().unwrap_or_default(),
				"Order assigned by dispatch"
			);
			self.publish(DispatchEvent::OrderAssigned {
				order: order.clone(),
				source: EventSource::Simulation,
			});
		}
		if let Some(order) = &outcome.delivered {
			tracing::info!(order_id = %order.id, "Order delivered");
			self.publish(DispatchEvent::OrderDelivered {
				order: order.clone(),
				source: EventSource::Simulation,
			});
		}
		if outcome.is_empty() {
			tracing::debug!("Dispatch tick made no change");
		}

		outcome
	}

	/// Creates a pending order.
	#[instrument(skip_all, fields(client = %request.client))]
	pub async fn create_order(&self, request: NewOrder) -> Result<Order, DispatchError> {
		let mut guard = self.state.lock().await;
		let order = OrderStateMachine::create_order(&mut guard.store, request, Utc::now())?;

		tracing::info!(
			order_id = %order.id,
			amount = %dispatch_types::format_amount(order.amount),
			"Order created"
		);
		self.publish(DispatchEvent::OrderCreated {
			order: order.clone(),
			source: EventSource::Manual,
		});
		Ok(order)
	}

	/// Creates a random pending order, as the dashboard's refresh action does.
	#[instrument(skip_all)]
	pub async fn simulate_incoming_order(&self) -> Result<Order, DispatchError> {
		let mut guard = self.state.lock().await;
		let DispatchState { store, rng } = &mut *guard;

		let request = self.generator.next_request(store.order_count(), rng.as_mut());
		let order = OrderStateMachine::create_order(store, request, Utc::now())?;

		tracing::info!(order_id = %order.id, "Incoming order received");
		self.publish(DispatchEvent::OrderCreated {
			order: order.clone(),
			source: EventSource::Simulation,
		});
		Ok(order)
	}

	/// Gives a pending order to a driver.
	#[instrument(skip(self))]
	pub async fn assign_driver(
		&self,
		order_id: &str,
		driver_id: &str,
	) -> Result<Order, DispatchError> {
		let mut guard = self.state.lock().await;
		let order = OrderStateMachine::assign_driver(&mut guard.store, order_id, driver_id)?;

		tracing::info!("Order assigned");
		self.publish(DispatchEvent::OrderAssigned {
			order: order.clone(),
			source: EventSource::Manual,
		});
		Ok(order)
	}

	/// Marks an assigned order as delivered.
	#[instrument(skip(self))]
	pub async fn mark_delivered(&self, order_id: &str) -> Result<Order, DispatchError> {
		let mut guard = self.state.lock().await;
		let order = OrderStateMachine::mark_delivered(&mut guard.store, order_id)?;

		tracing::info!("Order delivered");
		self.publish(DispatchEvent::OrderDelivered {
			order: order.clone(),
			source: EventSource::Manual,
		});
		Ok(order)
	}

	/// Snapshot of all orders, most recent first.
	pub async fn list_orders(&self) -> Vec<Order> {
		self.state.lock().await.store.list_orders()
	}

	/// Snapshot of all drivers, in seed order.
	pub async fn list_drivers(&self) -> Vec<Driver> {
		self.state.lock().await.store.list_drivers()
	}

	pub async fn find_order(&self, order_id: &str) -> Option<Order> {
		self.state.lock().await.store.find_order(order_id)
	}

	pub async fn find_driver(&self, driver_id: &str) -> Option<Driver> {
		self.state.lock().await.store.find_driver(driver_id)
	}

	pub async fn orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
		self.state.lock().await.store.orders_by_status(status)
	}

	/// Current dashboard statistics.
	pub async fn stats(&self) -> DashboardStats {
		stats::compute_stats(&self.state.lock().await.store)
	}

	/// Drivers by revenue, optionally truncated to the first `limit`.
	pub async fn ranking(&self, limit: Option<usize>) -> Vec<Driver> {
		let mut ranked = ranking::rank_drivers(self.state.lock().await.store.drivers());
		if let Some(limit) = limit {
			ranked.truncate(limit);
		}
		ranked
	}

	/// Drivers rated at least `min_rating`, best first.
	pub async fn top_drivers(&self, min_rating: f64) -> Vec<Driver> {
		ranking::top_drivers_by_rating(self.state.lock().await.store.drivers(), min_rating)
	}

	/// Assigned orders per driver.
	pub async fn driver_workload(&self) -> Vec<DriverWorkload> {
		ranking::driver_workload(&self.state.lock().await.store)
	}

	pub async fn drivers_in_region(&self, region: &str) -> Vec<Driver> {
		ranking::drivers_in_region(self.state.lock().await.store.drivers(), region)
	}

	/// Handled orders and revenue per region, highest revenue first.
	pub async fn region_summary(&self) -> Vec<RegionSummary> {
		ranking::region_summary(&self.state.lock().await.store)
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	fn publish(&self, event: DispatchEvent) {
		// No subscribers is fine
		self.event_bus.publish(event).ok();
	}
}
