// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use tracing::warn;

use crate::runtime::EdgetraceConfig;
use crate::ConfigError;

/// Validate the configuration.
///
/// Missing directories only warn: the compiled output may appear once the
/// first compilation finishes.
pub fn validate_config(config: &EdgetraceConfig) -> Result<(), ConfigError> {
	validate_stacktrace(config)?;
	validate_watch(config)?;

	Ok(())
}

fn validate_stacktrace(config: &EdgetraceConfig) -> Result<(), ConfigError> {
	let stacktrace = &config.stacktrace;

	if stacktrace.compiled_dir.as_os_str().is_empty() {
		return Err(ConfigError::invalid_value(
			"stacktrace.compiled_dir",
			"cannot be empty",
		));
	}

	if stacktrace.supabase_dir.as_os_str().is_empty() {
		return Err(ConfigError::invalid_value(
			"stacktrace.supabase_dir",
			"cannot be empty",
		));
	}

	if stacktrace.strategy.uses_source_maps() && !stacktrace.compiled_dir.is_dir() {
		warn!(
			compiled_dir = %stacktrace.compiled_dir.display(),
			"compiled output directory does not exist yet"
		);
	}

	if !stacktrace.supabase_dir.is_dir() {
		warn!(
			supabase_dir = %stacktrace.supabase_dir.display(),
			"supabase directory does not exist"
		);
	}

	Ok(())
}

fn validate_watch(config: &EdgetraceConfig) -> Result<(), ConfigError> {
	if config.watch.debounce_ms == 0 {
		return Err(ConfigError::invalid_value(
			"watch.debounce_ms",
			"must be at least 1",
		));
	}

	if config.watch.debounce_ms > 60_000 {
		warn!(
			debounce_ms = config.watch.debounce_ms,
			"watch debounce above one minute delays source map reloads"
		);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layer::ConfigLayer;
	use crate::paths::PathsConfig;
	use std::path::{Path, PathBuf};

	fn minimal_config() -> EdgetraceConfig {
		EdgetraceConfig::from_layer(
			ConfigLayer::default(),
			PathsConfig::new(Path::new("/tmp/config"), Path::new("/tmp/cwd")),
		)
		.unwrap()
	}

	#[test]
	fn test_minimal_config_is_valid() {
		assert!(validate_config(&minimal_config()).is_ok());
	}

	#[test]
	fn test_zero_debounce_fails() {
		let mut config = minimal_config();
		config.watch.debounce_ms = 0;

		let err = validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("debounce_ms"));
	}

	#[test]
	fn test_empty_compiled_dir_fails() {
		let mut config = minimal_config();
		config.stacktrace.compiled_dir = PathBuf::new();

		let err = validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("compiled_dir"));
	}

	#[test]
	fn test_missing_directories_only_warn() {
		let mut config = minimal_config();
		config.stacktrace.compiled_dir = PathBuf::from("/nonexistent/compiled");
		config.stacktrace.supabase_dir = PathBuf::from("/nonexistent/supabase");

		assert!(validate_config(&config).is_ok());
	}
}
