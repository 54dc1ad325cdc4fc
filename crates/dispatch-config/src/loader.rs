//! Multi-file configuration loading.
//!
//! The main file may name other files in `include`. They are read in the
//! listed order and merged into the main document:
//!
//! - `dashboard`, `dispatch` and `api` may each appear in one file only.
//! - `seed.drivers` and `seed.orders` are concatenated across files, so the
//!   fleet and the order backlog can be kept in separate files. A driver or
//!   order id that appears twice is rejected with both file names.
//! - Only the main file may include others, and each file is read once.
//!
//! Environment placeholders are substituted per file, before parsing.

use crate::{env, Config, ConfigError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Top-level sections a configuration file may contain.
const SECTIONS: &[&str] = &["dashboard", "dispatch", "seed", "api"];

/// Lists under `[seed]` that are concatenated across files.
const SEED_LISTS: &[&str] = &["drivers", "orders"];

/// Loads a main configuration file together with the files it includes.
pub struct ConfigLoader {
	/// Directory relative includes are resolved against.
	base_path: PathBuf,
	/// File that defined each non-seed section.
	section_sources: HashMap<String, PathBuf>,
	/// File that defined each seed entry, keyed by list and id.
	seed_sources: HashMap<(String, String), PathBuf>,
	/// Seed entries gathered so far, per list, in file order.
	seed_lists: BTreeMap<String, Vec<toml::Value>>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			section_sources: HashMap::new(),
			seed_sources: HashMap::new(),
			seed_lists: BTreeMap::new(),
		}
	}

	/// Reads `config_path` and its includes into one validated configuration.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let main_path = self.resolve_path(config_path)?;
		let mut main = read_document(&main_path).await?;
		let includes = take_includes(&mut main, &main_path)?;

		let mut loaded = HashSet::from([tokio::fs::canonicalize(&main_path).await?]);
		let mut merged = toml::Table::new();
		self.merge(&mut merged, main, &main_path)?;

		for include in includes {
			let path = self.resolve_path(&include)?;
			if !loaded.insert(tokio::fs::canonicalize(&path).await?) {
				return Err(ConfigError::Validation(format!(
					"{} is already loaded; each file may be included once",
					path.display()
				)));
			}

			let fragment = read_document(&path).await?;
			if fragment.contains_key("include") {
				return Err(ConfigError::Validation(format!(
					"{} includes other files; only the main file may do that",
					path.display()
				)));
			}
			self.merge(&mut merged, fragment, &path)?;
		}

		if !self.seed_lists.is_empty() {
			let seed = std::mem::take(&mut self.seed_lists)
				.into_iter()
				.map(|(list, entries)| (list, toml::Value::Array(entries)))
				.collect();
			merged.insert("seed".to_string(), toml::Value::Table(seed));
		}

		Config::from_table(merged)
	}

	/// Moves the sections of one file into the merged document.
	fn merge(
		&mut self,
		merged: &mut toml::Table,
		document: toml::Table,
		source: &Path,
	) -> Result<(), ConfigError> {
		for (section, value) in document {
			if !SECTIONS.contains(&section.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Unknown section '{}' in {}",
					section,
					source.display()
				)));
			}
			if section == "seed" {
				self.collect_seed(value, source)?;
				continue;
			}
			if let Some(first) = self
				.section_sources
				.insert(section.clone(), source.to_path_buf())
			{
				return Err(ConfigError::Validation(format!(
					"Section '{}' is defined in both {} and {}",
					section,
					first.display(),
					source.display()
				)));
			}
			merged.insert(section, value);
		}
		Ok(())
	}

	/// Appends the seed entries of one file, rejecting ids seen before.
	fn collect_seed(&mut self, seed: toml::Value, source: &Path) -> Result<(), ConfigError> {
		let toml::Value::Table(lists) = seed else {
			return Err(ConfigError::Validation(format!(
				"'seed' in {} must be a table",
				source.display()
			)));
		};

		for (list, entries) in lists {
			if !SEED_LISTS.contains(&list.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Unknown list 'seed.{}' in {}",
					list,
					source.display()
				)));
			}
			let toml::Value::Array(entries) = entries else {
				return Err(ConfigError::Validation(format!(
					"'seed.{}' in {} must be an array of tables",
					list,
					source.display()
				)));
			};

			for entry in &entries {
				let id = entry
					.get("id")
					.and_then(toml::Value::as_str)
					.ok_or_else(|| {
						ConfigError::Validation(format!(
							"An entry of 'seed.{}' in {} has no id",
							list,
							source.display()
						))
					})?;
				let key = (list.clone(), id.to_string());
				if let Some(first) = self.seed_sources.insert(key, source.to_path_buf()) {
					return Err(ConfigError::Validation(format!(
						"seed.{} id '{}' is defined in both {} and {}",
						list,
						id,
						first.display(),
						source.display()
					)));
				}
			}

			self.seed_lists.entry(list).or_default().extend(entries);
		}
		Ok(())
	}

	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		// join keeps absolute paths as they are
		let resolved = self.base_path.join(path);
		if resolved.is_file() {
			Ok(resolved)
		} else {
			Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)))
		}
	}
}

/// Reads one file, substitutes environment placeholders and parses it.
async fn read_document(path: &Path) -> Result<toml::Table, ConfigError> {
	let text = tokio::fs::read_to_string(path).await?;
	toml::from_str(&env::substitute(&text)?).map_err(|e: toml::de::Error| {
		ConfigError::Parse(format!("{}: {}", path.display(), e.message()))
	})
}

/// Removes `include` from the main document and returns the listed paths.
fn take_includes(document: &mut toml::Table, source: &Path) -> Result<Vec<PathBuf>, ConfigError> {
	let invalid = || {
		ConfigError::Validation(format!(
			"include in {} must be a path or a list of paths",
			source.display()
		))
	};

	match document.remove("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(paths)) => paths
			.iter()
			.map(|path| path.as_str().map(PathBuf::from).ok_or_else(invalid))
			.collect(),
		Some(_) => Err(invalid()),
	}
}
