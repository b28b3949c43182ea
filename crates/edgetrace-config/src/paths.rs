// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Config file locations.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// File name of the per-project config, looked up in the current directory.
pub const WORKSPACE_CONFIG_FILE: &str = "edgetrace.toml";

/// Resolved config file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// User config file: ~/.config/edgetrace/config.toml
	pub user_config_file: PathBuf,
	/// Workspace config file: ./edgetrace.toml
	pub workspace_config_file: PathBuf,
}

impl PathsConfig {
	/// Paths rooted at an explicit config home and working directory.
	pub fn new(config_home: &Path, cwd: &Path) -> Self {
		Self {
			user_config_file: config_home.join("edgetrace/config.toml"),
			workspace_config_file: cwd.join(WORKSPACE_CONFIG_FILE),
		}
	}

	/// Get the config directory (parent of user_config_file)
	pub fn config_dir(&self) -> PathBuf {
		self.user_config_file
			.parent()
			.map(|p| p.to_path_buf())
			.unwrap_or_else(|| self.user_config_file.clone())
	}
}

/// Resolve config paths from `XDG_CONFIG_HOME` (or `~/.config`) and the
/// current directory.
pub fn resolve_paths() -> Result<PathsConfig, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
		Some(dir) if !dir.is_empty() => PathBuf::from(dir),
		_ => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};
	let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;

	tracing::debug!(
		config_home = %config_home.display(),
		cwd = %cwd.display(),
		"resolved config paths"
	);

	Ok(PathsConfig::new(&config_home, &cwd))
}
