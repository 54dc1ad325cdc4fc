//! HTTP API implementations for the dispatch dashboard.
//!
//! Each submodule takes already-extracted request data, talks to the
//! engine and returns either the response payload or an [`APIError`].

use axum::extract::rejection::JsonRejection;
use dispatch_core::{DispatchError, EntityKind};
use dispatch_types::APIError;

pub mod drivers;
pub mod orders;
pub mod stats;

/// Maps an engine error onto the HTTP error taxonomy.
pub fn api_error(err: DispatchError) -> APIError {
	let message = err.to_string();
	match err {
		DispatchError::InvalidInput(_) => APIError::BadRequest {
			error_type: "INVALID_INPUT".to_string(),
			message,
		},
		DispatchError::NotFound { kind, .. } => APIError::NotFound {
			error_type: match kind {
				EntityKind::Order => "ORDER_NOT_FOUND",
				EntityKind::Driver => "DRIVER_NOT_FOUND",
			}
			.to_string(),
			message,
		},
		DispatchError::InvalidTransition { .. } => APIError::Conflict {
			error_type: "INVALID_TRANSITION".to_string(),
			message,
		},
	}
}

/// Reports a malformed JSON body as invalid input, like any other bad
/// argument, so clients always receive an `ErrorResponse`.
pub fn body_error(rejection: JsonRejection) -> APIError {
	APIError::BadRequest {
		error_type: "INVALID_INPUT".to_string(),
		message: rejection.body_text(),
	}
}
