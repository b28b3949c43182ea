// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for edgetrace.
//!
//! This crate provides:
//! - Layered configuration from defaults, TOML files, environment and CLI
//! - XDG compliant user config lookup
//! - Configuration validation
//!
//! Later layers override earlier ones field by field:
//! defaults, `~/.config/edgetrace/config.toml`, `./edgetrace.toml`, the
//! `--config` file, `EDGETRACE_*` variables, command line flags.

pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{EdgetraceConfig, LogFormat, LogLevel};
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration from all sources with CLI overrides on top.
pub fn load_config_with_cli(cli: CliOverrides) -> Result<EdgetraceConfig, ConfigError> {
	let paths = paths::resolve_paths()?;

	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(sources::DefaultsSource));
	registry.register(Box::new(sources::FileSource::user(&paths)));
	registry.register(Box::new(sources::FileSource::workspace(&paths)));
	if let Some(ref file) = cli.config_file {
		registry.register(Box::new(sources::FileSource::explicit(file.clone())));
	}
	registry.register(Box::new(sources::EnvSource::new()));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}
