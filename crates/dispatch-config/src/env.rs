//! `${VAR}` and `${VAR:-default}` substitution in configuration text.
//!
//! Substitution happens on the raw text so that numeric settings such as
//! `random_seed = ${DISPATCH_SEED}` can come from the environment. Every
//! unset variable without a default is collected, and the error lists all
//! of them with their line numbers.

use crate::ConfigError;
use regex::{Captures, Regex};

const PLACEHOLDER: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}";

pub(crate) fn substitute(input: &str) -> Result<String, ConfigError> {
	let placeholder = Regex::new(PLACEHOLDER)
		.map_err(|e| ConfigError::Parse(format!("Invalid placeholder pattern: {}", e)))?;

	let mut unset = Vec::new();
	let mut output = String::with_capacity(input.len());

	for (index, line) in input.split_inclusive('\n').enumerate() {
		let expanded = placeholder.replace_all(line, |caps: &Captures| {
			let name = caps.get(1).map_or("", |m| m.as_str());
			match (std::env::var(name), caps.get(2)) {
				(Ok(value), _) => value,
				(Err(_), Some(default)) => default.as_str().to_string(),
				(Err(_), None) => {
					unset.push(format!("{} (line {})", name, index + 1));
					String::new()
				},
			}
		});
		output.push_str(&expanded);
	}

	if unset.is_empty() {
		Ok(output)
	} else {
		Err(ConfigError::Validation(format!(
			"Unset environment variables: {}",
			unset.join(", ")
		)))
	}
}
