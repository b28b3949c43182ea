// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::path::PathBuf;

use tracing::{debug, trace, warn};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::ConfigError;

/// Prefix of every environment variable read by [`EnvSource`].
pub const ENV_PREFIX: &str = "EDGETRACE_";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	UserFile = 30,
	WorkspaceFile = 40,
	ExplicitFile = 45,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		// Defaults are applied when the runtime config is built
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
	required: bool,
}

impl FileSource {
	/// User config: ~/.config/edgetrace/config.toml
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			precedence: Precedence::UserFile,
			name: "user-config",
			required: false,
		}
	}

	/// Workspace config: ./edgetrace.toml
	pub fn workspace(paths: &PathsConfig) -> Self {
		Self {
			path: paths.workspace_config_file.clone(),
			precedence: Precedence::WorkspaceFile,
			name: "workspace-config",
			required: false,
		}
	}

	/// File named with `--config`. Unlike the implicit files it must exist.
	pub fn explicit(path: PathBuf) -> Self {
		Self {
			path,
			precedence: Precedence::ExplicitFile,
			name: "explicit-config",
			required: true,
		}
	}

	pub fn path(&self) -> &PathBuf {
		&self.path
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content =
			std::fs::read_to_string(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `EDGETRACE_<FIELD>`; empty values are ignored.
pub struct EnvSource {
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Read the process environment at load time.
	pub fn new() -> Self {
		Self { vars: None }
	}

	/// Read a fixed set of variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");

		let vars: Vec<(String, String)> = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars_os()
				.filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
				.collect(),
		};

		let mut layer = ConfigLayer::default();
		for (key, value) in vars {
			if !key.starts_with(ENV_PREFIX) {
				continue;
			}

			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			trace!(key = %key, "processing env var");

			match key.as_str() {
				"EDGETRACE_STRATEGY" => layer.stacktrace_mut().strategy = Some(value),
				"EDGETRACE_COMPILED_DIR" => {
					layer.stacktrace_mut().compiled_dir = Some(PathBuf::from(value))
				}
				"EDGETRACE_SUPABASE_DIR" => {
					layer.stacktrace_mut().supabase_dir = Some(PathBuf::from(value))
				}
				"EDGETRACE_WATCH" => match parse_bool(&value) {
					Some(enabled) => layer.watch_mut().enabled = Some(enabled),
					None => {
						return Err(ConfigError::invalid_value(
							key.clone(),
							format!("expected a boolean, got '{value}'"),
						))
					}
				},
				"EDGETRACE_WATCH_DEBOUNCE_MS" => match value.parse() {
					Ok(ms) => layer.watch_mut().debounce_ms = Some(ms),
					Err(_) => {
						return Err(ConfigError::invalid_value(
							key.clone(),
							format!("expected milliseconds, got '{value}'"),
						))
					}
				},
				"EDGETRACE_LOG_LEVEL" => layer.logging_mut().level = Some(value),
				"EDGETRACE_LOG_FORMAT" => layer.logging_mut().format = Some(value),
				_ => warn!(key = %key, "ignoring unknown environment variable"),
			}
		}

		Ok(layer)
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub strategy: Option<String>,
	pub compiled_dir: Option<PathBuf>,
	pub supabase_dir: Option<PathBuf>,
	pub watch: Option<bool>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let overrides = self.overrides.clone();
		let mut layer = ConfigLayer::default();

		if overrides.strategy.is_some() {
			layer.stacktrace_mut().strategy = overrides.strategy;
		}
		if overrides.compiled_dir.is_some() {
			layer.stacktrace_mut().compiled_dir = overrides.compiled_dir;
		}
		if overrides.supabase_dir.is_some() {
			layer.stacktrace_mut().supabase_dir = overrides.supabase_dir;
		}
		if overrides.watch.is_some() {
			layer.watch_mut().enabled = overrides.watch;
		}
		if overrides.log_level.is_some() {
			layer.logging_mut().level = overrides.log_level;
		}
		if overrides.log_format.is_some() {
			layer.logging_mut().format = overrides.log_format;
		}

		Ok(layer)
	}
}
