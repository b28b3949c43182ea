// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
	#[error("file watcher error: {0}")]
	Notify(#[from] notify::Error),

	#[error("I/O error at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("no existing directory to watch above {0}")]
	NoWatchableAncestor(PathBuf),

	#[error("failed to spawn watch thread: {0}")]
	Spawn(#[source] std::io::Error),
}

impl WatchError {
	pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.as_ref().to_path_buf(),
			source,
		}
	}
}
