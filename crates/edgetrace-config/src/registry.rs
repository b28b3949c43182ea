// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration registry - manages sources and merges layers.

use tracing::{debug, info};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::runtime::EdgetraceConfig;
use crate::sources::ConfigSource;
use crate::validation::validate_config;
use crate::ConfigError;

/// Registry that manages configuration sources and merges them.
pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	/// Create a new empty registry.
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	/// Register a configuration source.
	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		debug!(source = source.name(), precedence = ?source.precedence(), "registering config source");
		self.sources.push(source);
	}

	/// Load configuration from all sources, merge, and validate.
	///
	/// Sources are merged lowest precedence first. A source that fails to
	/// load fails the whole load; absent optional files load as empty layers.
	pub fn load(&self, paths: PathsConfig) -> Result<EdgetraceConfig, ConfigError> {
		let mut sorted_sources: Vec<_> = self.sources.iter().collect();
		sorted_sources.sort_by_key(|s| s.precedence());

		debug!(
			source_count = sorted_sources.len(),
			"loading configuration from sources"
		);

		let mut merged = ConfigLayer::default();
		for source in &sorted_sources {
			let layer = source.load()?;
			debug!(source = source.name(), "merging config layer");
			merged.merge(layer);
		}

		let config = EdgetraceConfig::from_layer(merged, paths)?;
		validate_config(&config)?;

		info!(
			strategy = %config.stacktrace.strategy,
			compiled_dir = %config.stacktrace.compiled_dir.display(),
			watch = config.watch_enabled(),
			"configuration loaded"
		);

		Ok(config)
	}

	/// Get the number of registered sources.
	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}

impl Default for ConfigRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sources::{
		CliOverrides, CliSource, DefaultsSource, EnvSource, FileSource, Precedence,
	};
	use edgetrace_stacktrace::ResolutionStrategy;
	use std::path::Path;
	use tempfile::TempDir;

	fn paths() -> PathsConfig {
		PathsConfig::new(Path::new("/nonexistent/config"), Path::new("/nonexistent/cwd"))
	}

	#[test]
	fn test_registry_registers_sources() {
		let mut registry = ConfigRegistry::new();
		assert_eq!(registry.source_count(), 0);

		registry.register(Box::new(DefaultsSource));
		assert_eq!(registry.source_count(), 1);
	}

	#[test]
	fn test_registry_loads_with_defaults() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(DefaultsSource));

		let config = registry.load(paths()).unwrap();
		assert_eq!(config.stacktrace.strategy, ResolutionStrategy::JsOnly);
	}

	/// Sources are merged in precedence order regardless of registration order.
	#[test]
	fn test_precedence_merge_order() {
		struct MockSource {
			name: &'static str,
			precedence: Precedence,
			strategy: &'static str,
		}

		impl ConfigSource for MockSource {
			fn name(&self) -> &'static str {
				self.name
			}
			fn precedence(&self) -> Precedence {
				self.precedence
			}

			fn load(&self) -> Result<ConfigLayer, ConfigError> {
				let mut layer = ConfigLayer::default();
				layer.stacktrace_mut().strategy = Some(self.strategy.to_string());
				Ok(layer)
			}
		}

		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(MockSource {
			name: "cli",
			precedence: Precedence::Cli,
			strategy: "kotlin-only",
		}));
		registry.register(Box::new(MockSource {
			name: "user",
			precedence: Precedence::UserFile,
			strategy: "none",
		}));

		let config = registry.load(paths()).unwrap();
		assert_eq!(config.stacktrace.strategy, ResolutionStrategy::KotlinOnly);
	}

	#[test]
	fn test_full_stack_of_sources() {
		let dir = TempDir::new().unwrap();
		let paths = PathsConfig::new(&dir.path().join("xdg"), dir.path());
		std::fs::create_dir_all(paths.config_dir()).unwrap();
		std::fs::write(
			&paths.user_config_file,
			"[stacktrace]\nstrategy = \"none\"\ncompiled_dir = \"/user/out\"\n\n[logging]\nformat = \"compact\"\n",
		)
		.unwrap();
		std::fs::write(
			&paths.workspace_config_file,
			"[stacktrace]\nstrategy = \"kotlin-only\"\n",
		)
		.unwrap();

		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(DefaultsSource));
		registry.register(Box::new(FileSource::user(&paths)));
		registry.register(Box::new(FileSource::workspace(&paths)));
		registry.register(Box::new(EnvSource::from_vars([(
			"EDGETRACE_WATCH_DEBOUNCE_MS",
			"75",
		)])));
		registry.register(Box::new(CliSource::new(CliOverrides {
			strategy: Some("kotlin-preferred".to_string()),
			..Default::default()
		})));

		let config = registry.load(paths).unwrap();

		assert_eq!(config.stacktrace.strategy, ResolutionStrategy::KotlinPreferred);
		assert_eq!(config.stacktrace.compiled_dir, Path::new("/user/out"));
		assert_eq!(config.watch.debounce_ms, 75);
		assert_eq!(config.logging.format, crate::runtime::LogFormat::Compact);
	}

	#[test]
	fn test_source_error_fails_load() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(EnvSource::from_vars([(
			"EDGETRACE_WATCH_DEBOUNCE_MS",
			"-1",
		)])));

		assert!(registry.load(paths()).is_err());
	}

	#[test]
	fn test_validation_error_fails_load() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(EnvSource::from_vars([(
			"EDGETRACE_WATCH_DEBOUNCE_MS",
			"0",
		)])));

		assert!(matches!(
			registry.load(paths()),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
