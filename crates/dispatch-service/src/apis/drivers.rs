//! Driver endpoints.

use dispatch_core::DispatchEngine;
use dispatch_types::{
	APIError, Driver, DriverWorkload, RankingQuery, RegionSummary, TopDriversQuery,
};

pub async fn list_drivers(engine: &DispatchEngine) -> Vec<Driver> {
	engine.list_drivers().await
}

pub async fn get_driver(id: &str, engine: &DispatchEngine) -> Result<Driver, APIError> {
	engine.find_driver(id).await.ok_or_else(|| APIError::NotFound {
		error_type: "DRIVER_NOT_FOUND".to_string(),
		message: format!("Driver not found: {}", id),
	})
}

/// Drivers ordered by revenue, best first.
pub async fn ranking(query: RankingQuery, engine: &DispatchEngine) -> Vec<Driver> {
	engine.ranking(query.limit).await
}

pub async fn top_drivers(
	query: TopDriversQuery,
	engine: &DispatchEngine,
) -> Result<Vec<Driver>, APIError> {
	if !query.min_rating.is_finite() {
		return Err(APIError::BadRequest {
			error_type: "INVALID_RATING".to_string(),
			message: format!("min_rating must be a finite number, got {}", query.min_rating),
		});
	}
	Ok(engine.top_drivers(query.min_rating).await)
}

pub async fn workload(engine: &DispatchEngine) -> Vec<DriverWorkload> {
	engine.driver_workload().await
}

pub async fn regions(engine: &DispatchEngine) -> Vec<RegionSummary> {
	engine.region_summary().await
}

/// Drivers of one region. An unknown region is an empty list, not an error.
pub async fn drivers_in_region(region: &str, engine: &DispatchEngine) -> Vec<Driver> {
	engine.drivers_in_region(region).await
}
