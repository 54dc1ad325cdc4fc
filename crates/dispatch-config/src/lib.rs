//! Configuration module for the dispatch dashboard.
//!
//! This module provides structures and utilities for managing dashboard
//! configuration. It supports loading configuration from TOML files and
//! validates the dispatch parameters and the seed data before anything
//! is built from them.
//!
//! ## Modular Configuration Support
//!
//! The main file may list other files under `include`, for example to keep
//! the driver fleet and the order backlog apart from the dispatch settings.
//! See [`loader`] for how the files are merged.

mod env;
pub mod loader;
mod seed;

pub use seed::{SeedConfig, SeedDriver, SeedOrder};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the dashboard.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this dashboard instance.
	pub dashboard: DashboardConfig,
	/// Parameters of the periodic dispatch simulation.
	#[serde(default)]
	pub dispatch: DispatchConfig,
	/// Orders and drivers loaded into the store at startup.
	/// Defaults to the reference data set when the section is absent.
	#[serde(default = "SeedConfig::reference")]
	pub seed: SeedConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the dashboard instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
	/// Unique identifier for this dashboard instance.
	pub id: String,
}

/// Parameters of the dispatch transition engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
	/// Seconds between two simulation ticks.
	#[serde(default = "default_tick_interval_seconds")]
	pub tick_interval_seconds: u64,
	/// Chance per tick that the first pending order gets a driver.
	#[serde(default = "default_assign_probability")]
	pub assign_probability: f64,
	/// Chance per tick that the first assigned order is delivered.
	#[serde(default = "default_deliver_probability")]
	pub deliver_probability: f64,
	/// Fixed seed for the random source. Entropy-seeded when absent.
	#[serde(default)]
	pub random_seed: Option<u64>,
}

impl Default for DispatchConfig {
	fn default() -> Self {
		Self {
			tick_interval_seconds: default_tick_interval_seconds(),
			assign_probability: default_assign_probability(),
			deliver_probability: default_deliver_probability(),
			random_seed: None,
		}
	}
}

fn default_tick_interval_seconds() -> u64 {
	5
}

fn default_assign_probability() -> f64 {
	0.3
}

fn default_deliver_probability() -> f64 {
	0.2
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Longest accepted tick interval (one hour).
const MAX_TICK_INTERVAL_SECONDS: u64 = 3600;

impl Config {
	/// Loads configuration from a file, following include directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Deserializes a merged document and validates it.
	pub(crate) fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
		let config: Config = toml::Value::Table(table).try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Validates the configuration:
	/// - dashboard ID is not empty
	/// - tick interval and probabilities are within range
	/// - seed data is internally consistent
	fn validate(&self) -> Result<(), ConfigError> {
		if self.dashboard.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Dashboard ID cannot be empty".into(),
			));
		}

		let dispatch = &self.dispatch;
		if dispatch.tick_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"dispatch.tick_interval_seconds must be greater than 0".into(),
			));
		}
		if dispatch.tick_interval_seconds > MAX_TICK_INTERVAL_SECONDS {
			return Err(ConfigError::Validation(format!(
				"dispatch.tick_interval_seconds cannot exceed {}",
				MAX_TICK_INTERVAL_SECONDS
			)));
		}
		validate_probability("dispatch.assign_probability", dispatch.assign_probability)?;
		validate_probability("dispatch.deliver_probability", dispatch.deliver_probability)?;

		self.seed.validate()?;

		if let Some(api) = &self.api {
			if api.enabled && api.host.trim().is_empty() {
				return Err(ConfigError::Validation(
					"api.host cannot be empty when the API is enabled".into(),
				));
			}
		}

		Ok(())
	}
}

fn validate_probability(name: &str, value: f64) -> Result<(), ConfigError> {
	if !(0.0..=1.0).contains(&value) {
		return Err(ConfigError::Validation(format!(
			"{} must be between 0.0 and 1.0, got {}",
			name, value
		)));
	}
	Ok(())
}

/// Parses a single TOML document into a validated configuration.
///
/// Environment variables are substituted before parsing. `include` needs a
/// base directory and is only accepted by [`Config::from_file`].
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let table: toml::Table = toml::from_str(&env::substitute(s)?)?;
		if table.contains_key("include") {
			return Err(ConfigError::Validation(
				"include is only supported when loading from a file".into(),
			));
		}
		Self::from_table(table)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_minimal_config_uses_reference_defaults() {
		let config: Config = "[dashboard]\nid = \"paris\"\n".parse().unwrap();

		assert_eq!(config.dashboard.id, "paris");
		assert_eq!(config.dispatch.tick_interval_seconds, 5);
		assert_eq!(config.dispatch.assign_probability, 0.3);
		assert_eq!(config.dispatch.deliver_probability, 0.2);
		assert!(config.dispatch.random_seed.is_none());
		assert_eq!(config.seed.orders.len(), 6);
		assert_eq!(config.seed.drivers.len(), 5);
		assert!(config.api.is_none());
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_DASHBOARD_SEED", "42");

		let config_str = r#"
[dashboard]
id = "paris"

[dispatch]
tick_interval_seconds = 1
assign_probability = 1.0
deliver_probability = 0.0
random_seed = ${TEST_DASHBOARD_SEED}

[api]
enabled = true
port = ${TEST_DASHBOARD_API_PORT:-4000}
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.dispatch.random_seed, Some(42));
		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 4000);

		std::env::remove_var("TEST_DASHBOARD_SEED");
	}

	#[test]
	fn test_include_requires_a_file() {
		let result = "include = [\"seed.toml\"]\n[dashboard]\nid = \"paris\"\n".parse::<Config>();
		let err = result.unwrap_err().to_string();
		assert!(err.contains("include"));
	}

	#[test]
	fn test_unset_variable_fails_parse() {
		let result = "[dashboard]\nid = \"${UNSET_DASHBOARD_ID}\"\n".parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_empty_dashboard_id_rejected() {
		let result = "[dashboard]\nid = \"  \"\n".parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_probability_out_of_range_rejected() {
		let config_str = r#"
[dashboard]
id = "paris"

[dispatch]
assign_probability = 1.5
"#;
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("assign_probability"));
	}

	#[test]
	fn test_zero_tick_interval_rejected() {
		let config_str = r#"
[dashboard]
id = "paris"

[dispatch]
tick_interval_seconds = 0
"#;
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("tick_interval_seconds"));
	}

	#[test]
	fn test_custom_seed_replaces_reference_data() {
		let config_str = r#"
[dashboard]
id = "lyon"

[[seed.drivers]]
id = "d1"
name = "Alice Dupont"
region = "Lyon"
rating = 4.8
deliveries = 10
revenue = 250

[[seed.orders]]
id = "c1"
client = "Client A"
destination = "Croix-Rousse"
amount = 12

[[seed.orders]]
id = "c2"
client = "Client B"
destination = "Confluence"
amount = 30
status = "assigned"
driver = "d1"
created_at = "2024-05-01T14:05:00Z"
"#;
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.seed.drivers.len(), 1);
		assert_eq!(config.seed.orders.len(), 2);
		assert_eq!(config.seed.orders[0].status, dispatch_types::OrderStatus::Pending);
		assert!(config.seed.orders[1].created_at.is_some());
	}
}
