//! API types for the dispatch dashboard HTTP API.
//!
//! This module defines the request and response payloads used by the
//! presentation layer to read snapshots and forward user intents.

use crate::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for assigning a driver to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDriverRequest {
	pub driver_id: String,
}

/// Query parameters for listing orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
	/// Restrict the listing to one status.
	pub status: Option<OrderStatus>,
}

/// Query parameters for the driver ranking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingQuery {
	/// Maximum number of drivers to return.
	pub limit: Option<usize>,
}

/// Query parameters for the top-rated drivers listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopDriversQuery {
	pub min_rating: f64,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Machine-readable error code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// API error type with its HTTP status.
#[derive(Debug, Clone)]
pub enum APIError {
	/// Malformed request (400)
	BadRequest { error_type: String, message: String },
	/// Unknown resource (404)
	NotFound { error_type: String, message: String },
	/// Request conflicts with the current resource state (409)
	Conflict { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::NotFound { .. } => 404,
			APIError::Conflict { .. } => 409,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest { error_type, message }
			| APIError::NotFound { error_type, message }
			| APIError::Conflict { error_type, message } => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match &self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::NotFound { .. } => StatusCode::NOT_FOUND,
			APIError::Conflict { .. } => StatusCode::CONFLICT,
		};

		(status, Json(self.to_error_response())).into_response()
	}
}
