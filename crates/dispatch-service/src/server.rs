//! HTTP server for the dispatch dashboard API.
//!
//! Every route reads a snapshot from, or forwards a user action to, the
//! shared [`DispatchEngine`]. Nothing here holds state of its own.

use axum::{
	extract::{rejection::JsonRejection, Path, Query, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use dispatch_config::ApiConfig;
use dispatch_core::DispatchEngine;
use dispatch_types::{
	APIError, AssignDriverRequest, DashboardStats, Driver, DriverWorkload, NewOrder, Order,
	OrderListQuery, RankingQuery, RegionSummary, TopDriversQuery,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Engine owning the store, the simulation and the event bus.
	pub engine: Arc<DispatchEngine>,
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<DispatchEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { engine });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Dispatch API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Builds the router with every endpoint nested under `/api`.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", get(handle_list_orders).post(handle_create_order))
				.route("/orders/simulate", post(handle_simulate_order))
				.route("/orders/{id}", get(handle_get_order))
				.route("/orders/{id}/assign", post(handle_assign_driver))
				.route("/orders/{id}/deliver", post(handle_mark_delivered))
				.route("/drivers", get(handle_list_drivers))
				.route("/drivers/ranking", get(handle_ranking))
				.route("/drivers/top", get(handle_top_drivers))
				.route("/drivers/workload", get(handle_workload))
				.route("/drivers/regions", get(handle_regions))
				.route("/drivers/regions/{region}", get(handle_drivers_in_region))
				.route("/drivers/{id}", get(handle_get_driver))
				.route("/stats", get(handle_stats)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Handles GET /api/orders requests.
async fn handle_list_orders(
	State(state): State<AppState>,
	Query(query): Query<OrderListQuery>,
) -> Json<Vec<Order>> {
	Json(crate::apis::orders::list_orders(query, &state.engine).await)
}

/// Handles GET /api/orders/{id} requests.
async fn handle_get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, APIError> {
	match crate::apis::orders::get_order(&id, &state.engine).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders requests.
///
/// Creates a pending order from the submitted client, destination and amount.
async fn handle_create_order(
	State(state): State<AppState>,
	payload: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), APIError> {
	let Json(request) = payload.map_err(|rejection| {
		tracing::warn!("Rejected order body: {}", rejection.body_text());
		crate::apis::body_error(rejection)
	})?;
	match crate::apis::orders::create_order(request, &state.engine).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/simulate requests.
async fn handle_simulate_order(
	State(state): State<AppState>,
) -> Result<(StatusCode, Json<Order>), APIError> {
	match crate::apis::orders::simulate_order(&state.engine).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			tracing::warn!("Simulated order failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/assign requests.
async fn handle_assign_driver(
	Path(id): Path<String>,
	State(state): State<AppState>,
	payload: Result<Json<AssignDriverRequest>, JsonRejection>,
) -> Result<Json<Order>, APIError> {
	let Json(request) = payload.map_err(|rejection| {
		tracing::warn!("Rejected assignment body: {}", rejection.body_text());
		crate::apis::body_error(rejection)
	})?;
	match crate::apis::orders::assign_driver(&id, request, &state.engine).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Driver assignment failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/deliver requests.
async fn handle_mark_delivered(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, APIError> {
	match crate::apis::orders::mark_delivered(&id, &state.engine).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Delivery failed: {}", e);
			Err(e)
		},
	}
}

async fn handle_list_drivers(State(state): State<AppState>) -> Json<Vec<Driver>> {
	Json(crate::apis::drivers::list_drivers(&state.engine).await)
}

async fn handle_get_driver(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Driver>, APIError> {
	match crate::apis::drivers::get_driver(&id, &state.engine).await {
		Ok(driver) => Ok(Json(driver)),
		Err(e) => {
			tracing::warn!("Driver retrieval failed: {}", e);
			Err(e)
		},
	}
}

async fn handle_ranking(
	State(state): State<AppState>,
	Query(query): Query<RankingQuery>,
) -> Json<Vec<Driver>> {
	Json(crate::apis::drivers::ranking(query, &state.engine).await)
}

async fn handle_top_drivers(
	State(state): State<AppState>,
	Query(query): Query<TopDriversQuery>,
) -> Result<Json<Vec<Driver>>, APIError> {
	crate::apis::drivers::top_drivers(query, &state.engine)
		.await
		.map(Json)
}

async fn handle_workload(State(state): State<AppState>) -> Json<Vec<DriverWorkload>> {
	Json(crate::apis::drivers::workload(&state.engine).await)
}

/// Handles GET /api/drivers/regions requests.
async fn handle_regions(State(state): State<AppState>) -> Json<Vec<RegionSummary>> {
	Json(crate::apis::drivers::regions(&state.engine).await)
}

async fn handle_drivers_in_region(
	Path(region): Path<String>,
	State(state): State<AppState>,
) -> Json<Vec<Driver>> {
	Json(crate::apis::drivers::drivers_in_region(&region, &state.engine).await)
}

/// Handles GET /api/stats requests.
async fn handle_stats(State(state): State<AppState>) -> Json<DashboardStats> {
	Json(crate::apis::stats::get_stats(&state.engine).await)
}
