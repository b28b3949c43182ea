// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use std::path::PathBuf;
use std::time::Duration;

use edgetrace_stacktrace::ResolutionStrategy;
use serde::Serialize;

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::ConfigError;

/// Kotlin/JS development build output of a Gradle project.
pub const DEFAULT_COMPILED_DIR: &str = "build/compileSync/js/main/developmentExecutable/kotlin";
pub const DEFAULT_SUPABASE_DIR: &str = "supabase";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// The final, validated configuration.
#[derive(Debug, Clone, Serialize)]
pub struct EdgetraceConfig {
	pub stacktrace: StacktraceConfig,
	pub watch: WatchConfig,
	pub logging: LoggingConfig,

	/// Resolved config file locations (not serialized)
	#[serde(skip)]
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StacktraceConfig {
	pub strategy: ResolutionStrategy,
	pub compiled_dir: PathBuf,
	pub supabase_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WatchConfig {
	pub enabled: bool,
	pub debounce_ms: u64,
}

impl WatchConfig {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	Warn,
	#[default]
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

impl Default for StacktraceConfig {
	fn default() -> Self {
		Self {
			strategy: ResolutionStrategy::default(),
			compiled_dir: PathBuf::from(DEFAULT_COMPILED_DIR),
			supabase_dir: PathBuf::from(DEFAULT_SUPABASE_DIR),
		}
	}
}

impl Default for WatchConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			debounce_ms: DEFAULT_DEBOUNCE_MS,
		}
	}
}

impl EdgetraceConfig {
	/// Build runtime config from a merged layer and paths.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			stacktrace: build_stacktrace_config(layer.stacktrace)?,
			watch: build_watch_config(layer.watch),
			logging: build_logging_config(layer.logging)?,
			paths,
		})
	}

	/// Whether a reload watcher should run for this configuration.
	pub fn watch_enabled(&self) -> bool {
		self.watch.enabled && self.stacktrace.strategy.uses_source_maps()
	}
}

fn build_stacktrace_config(
	layer: Option<StacktraceLayer>,
) -> Result<StacktraceConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	let defaults = StacktraceConfig::default();

	let strategy = match layer.strategy.as_deref() {
		Some(s) => s
			.parse()
			.map_err(|e| ConfigError::invalid_value("stacktrace.strategy", format!("{e}")))?,
		None => defaults.strategy,
	};

	let supabase_dir = layer.supabase_dir.unwrap_or(defaults.supabase_dir);
	// The legacy runtime root is replaced textually, so it must be absolute.
	let supabase_dir = std::fs::canonicalize(&supabase_dir).unwrap_or(supabase_dir);

	Ok(StacktraceConfig {
		strategy,
		compiled_dir: layer.compiled_dir.unwrap_or(defaults.compiled_dir),
		supabase_dir,
	})
}

fn build_watch_config(layer: Option<WatchLayer>) -> WatchConfig {
	let layer = layer.unwrap_or_default();
	let defaults = WatchConfig::default();
	WatchConfig {
		enabled: layer.enabled.unwrap_or(defaults.enabled),
		debounce_ms: layer.debounce_ms.unwrap_or(defaults.debounce_ms),
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> Result<LoggingConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	Ok(LoggingConfig {
		level: parse_log_level(layer.level.as_deref())?,
		format: parse_log_format(layer.format.as_deref())?,
	})
}

pub fn parse_log_level(s: Option<&str>) -> Result<LogLevel, ConfigError> {
	match s.map(str::to_ascii_lowercase).as_deref() {
		Some("error") => Ok(LogLevel::Error),
		Some("warn") | Some("warning") => Ok(LogLevel::Warn),
		Some("info") | None => Ok(LogLevel::Info),
		Some("debug") => Ok(LogLevel::Debug),
		Some("trace") => Ok(LogLevel::Trace),
		Some(other) => Err(ConfigError::invalid_value(
			"logging.level",
			format!("unknown level '{other}' (expected error, warn, info, debug or trace)"),
		)),
	}
}

pub fn parse_log_format(s: Option<&str>) -> Result<LogFormat, ConfigError> {
	match s.map(str::to_ascii_lowercase).as_deref() {
		Some("json") => Ok(LogFormat::Json),
		Some("compact") => Ok(LogFormat::Compact),
		Some("pretty") | None => Ok(LogFormat::Pretty),
		Some(other) => Err(ConfigError::invalid_value(
			"logging.format",
			format!("unknown format '{other}' (expected pretty, compact or json)"),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::Path;
	use tempfile::TempDir;

	fn paths() -> PathsConfig {
		PathsConfig::new(Path::new("/tmp/test/config"), Path::new("/tmp/test/cwd"))
	}

	#[test]
	fn test_empty_layer_uses_defaults() {
		let config = EdgetraceConfig::from_layer(ConfigLayer::default(), paths()).unwrap();

		assert_eq!(config.stacktrace.strategy, ResolutionStrategy::JsOnly);
		assert_eq!(config.stacktrace.compiled_dir, PathBuf::from(DEFAULT_COMPILED_DIR));
		assert_eq!(config.watch, WatchConfig::default());
		assert_eq!(config.watch.debounce(), Duration::from_millis(300));
		assert_eq!(config.logging, LoggingConfig::default());
		assert!(!config.watch_enabled(), "js-only never needs the watcher");
	}

	#[test]
	fn test_layer_values_are_applied() {
		let mut layer = ConfigLayer::default();
		layer.stacktrace_mut().strategy = Some("kotlin-preferred".to_string());
		layer.stacktrace_mut().supabase_dir = Some(PathBuf::from("/nonexistent/supabase"));
		layer.watch_mut().debounce_ms = Some(40);
		layer.logging_mut().level = Some("DEBUG".to_string());
		layer.logging_mut().format = Some("json".to_string());

		let config = EdgetraceConfig::from_layer(layer, paths()).unwrap();

		assert_eq!(config.stacktrace.strategy, ResolutionStrategy::KotlinPreferred);
		assert_eq!(
			config.stacktrace.supabase_dir,
			PathBuf::from("/nonexistent/supabase")
		);
		assert_eq!(config.watch.debounce_ms, 40);
		assert_eq!(config.logging.level, LogLevel::Debug);
		assert_eq!(config.logging.format, LogFormat::Json);
		assert!(config.watch_enabled());
	}

	#[test]
	fn test_existing_supabase_dir_is_canonical() {
		let dir = TempDir::new().unwrap();
		let nested = dir.path().join("supabase");
		std::fs::create_dir(&nested).unwrap();

		let mut layer = ConfigLayer::default();
		layer.stacktrace_mut().supabase_dir = Some(dir.path().join("supabase/../supabase"));

		let config = EdgetraceConfig::from_layer(layer, paths()).unwrap();
		assert_eq!(
			config.stacktrace.supabase_dir,
			std::fs::canonicalize(nested).unwrap()
		);
	}

	#[test]
	fn test_unknown_strategy_is_invalid_value() {
		let mut layer = ConfigLayer::default();
		layer.stacktrace_mut().strategy = Some("kotlin".to_string());

		match EdgetraceConfig::from_layer(layer, paths()) {
			Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "stacktrace.strategy"),
			other => panic!("expected InvalidValue, got {other:?}"),
		}
	}

	#[test]
	fn test_parse_log_level_and_format() {
		assert_eq!(parse_log_level(None).unwrap(), LogLevel::Info);
		assert_eq!(parse_log_level(Some("warning")).unwrap(), LogLevel::Warn);
		assert!(parse_log_level(Some("loud")).is_err());

		assert_eq!(parse_log_format(Some("Compact")).unwrap(), LogFormat::Compact);
		assert!(parse_log_format(Some("xml")).is_err());
	}

	#[test]
	fn test_serializes_to_toml() {
		let config = EdgetraceConfig::from_layer(ConfigLayer::default(), paths()).unwrap();
		let text = toml::to_string(&config).unwrap();

		assert!(text.contains("strategy = \"js-only\""));
		assert!(text.contains("debounce_ms = 300"));
		assert!(text.contains("format = \"pretty\""));
	}
}
