//! Main entry point for the dispatch dashboard service.
//!
//! Loads the configuration, seeds the entity store, runs the periodic
//! dispatch simulation and, when enabled, serves the HTTP API that the
//! dashboard front end reads snapshots from and sends user actions to.

use clap::Parser;
use dispatch_config::Config;
use dispatch_core::{DispatchBuilder, DispatchEngine};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the dispatch service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/dashboard.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started dispatch service");

	let config = load_config(&args).await?;
	tracing::info!("Loaded configuration [{}]", config.dashboard.id);

	let engine = Arc::new(build_engine(config.clone())?);
	engine.initialize().await;

	match config.api.clone().filter(|api| api.enabled) {
		Some(api_config) => {
			let api_engine = Arc::clone(&engine);

			tokio::select! {
				_ = engine.run() => {
					tracing::info!("Dispatch simulation finished");
				}
				result = server::start_server(api_config, api_engine) => {
					tracing::info!("API server finished");
					result?;
				}
			}
		},
		None => {
			tracing::info!("Starting dispatch simulation only");
			engine.run().await;
		},
	}

	engine.shutdown().await;
	tracing::info!("Stopped dispatch service");
	Ok(())
}

async fn load_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
	let path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Config path is not valid UTF-8: {}", args.config.display()))?;
	Ok(Config::from_file(path).await?)
}

fn build_engine(config: Config) -> Result<DispatchEngine, Box<dyn std::error::Error>> {
	Ok(DispatchBuilder::new(config).build()?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::tempdir;

	#[test]
	fn test_args_default_values() {
		let args = Args::try_parse_from(["dispatch"]).unwrap();

		assert_eq!(args.config, PathBuf::from("config/dashboard.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn test_args_custom_values() {
		let args =
			Args::try_parse_from(["dispatch", "--config", "custom.toml", "-l", "debug"]).unwrap();

		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "debug");
	}

	#[tokio::test]
	async fn test_load_config_and_build_engine() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("dashboard.toml");
		fs::write(
			&path,
			"[dashboard]\nid = \"paris\"\n\n[dispatch]\nrandom_seed = 3\n",
		)
		.unwrap();

		let args = Args {
			config: path,
			log_level: "info".to_string(),
		};
		let config = load_config(&args).await.unwrap();
		let engine = build_engine(config).unwrap();

		assert_eq!(engine.stats().await.total_orders, 6);
	}

	#[tokio::test]
	async fn test_bundled_config_loads() {
		let args = Args {
			config: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/dashboard.toml"),
			log_level: "info".to_string(),
		};
		let config = load_config(&args).await.unwrap();

		assert_eq!(config.seed.drivers.len(), 5);
		assert_eq!(config.seed.orders.len(), 6);
		assert!(config.api.is_some_and(|api| api.enabled));
	}

	#[tokio::test]
	async fn test_missing_config_file_fails() {
		let dir = tempdir().unwrap();
		let args = Args {
			config: dir.path().join("absent.toml"),
			log_level: "info".to_string(),
		};

		assert!(load_config(&args).await.is_err());
	}
}
