//! Order endpoints: listing, lookup and the three user actions.

use super::api_error;
use dispatch_core::DispatchEngine;
use dispatch_types::{APIError, AssignDriverRequest, NewOrder, Order, OrderListQuery};
use tracing::info;

/// Lists orders, newest first, optionally filtered by status.
pub async fn list_orders(query: OrderListQuery, engine: &DispatchEngine) -> Vec<Order> {
	match query.status {
		Some(status) => engine.orders_by_status(status).await,
		None => engine.list_orders().await,
	}
}

pub async fn get_order(id: &str, engine: &DispatchEngine) -> Result<Order, APIError> {
	engine.find_order(id).await.ok_or_else(|| APIError::NotFound {
		error_type: "ORDER_NOT_FOUND".to_string(),
		message: format!("Order not found: {}", id),
	})
}

pub async fn create_order(request: NewOrder, engine: &DispatchEngine) -> Result<Order, APIError> {
	info!("Creating order for {} to {}", request.client, request.destination);
	engine.create_order(request).await.map_err(api_error)
}

pub async fn simulate_order(engine: &DispatchEngine) -> Result<Order, APIError> {
	engine.simulate_incoming_order().await.map_err(api_error)
}

pub async fn assign_driver(
	id: &str,
	request: AssignDriverRequest,
	engine: &DispatchEngine,
) -> Result<Order, APIError> {
	info!("Assigning driver {} to order {}", request.driver_id, id);
	engine
		.assign_driver(id, &request.driver_id)
		.await
		.map_err(api_error)
}

pub async fn mark_delivered(id: &str, engine: &DispatchEngine) -> Result<Order, APIError> {
	info!("Marking order {} delivered", id);
	engine.mark_delivered(id).await.map_err(api_error)
}
