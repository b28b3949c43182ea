// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reloadable handle to the current source map table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use edgetrace_sourcemap::SourceMapTable;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::strategy::ResolutionStrategy;

struct Inner {
	root: PathBuf,
	strategy: ResolutionStrategy,
	current: RwLock<Arc<SourceMapTable>>,
	reload_lock: Mutex<()>,
}

/// Shared, swappable source map table.
///
/// Readers take a snapshot per call and keep it for the whole call; a reload
/// builds the replacement table without holding any lock and publishes it
/// with a single pointer swap. Clones share the same table.
///
/// The handle carries the resolution strategy, so a rewriter built on it
/// always agrees with the maps it reads.
#[derive(Clone)]
pub struct SharedSourceMaps {
	inner: Arc<Inner>,
}

impl SharedSourceMaps {
	/// Index `root` for `strategy`.
	///
	/// Strategies that never consult source maps get an empty table and no
	/// filesystem access, now or on reload.
	pub fn load(root: impl Into<PathBuf>, strategy: ResolutionStrategy) -> Self {
		let root = root.into();

		let table = if strategy.uses_source_maps() {
			SourceMapTable::build(&root)
		} else {
			debug!(%strategy, "source maps not used by strategy, skipping scan");
			SourceMapTable::empty()
		};

		Self::from_parts(root, strategy, table)
	}

	/// Wrap an already built table.
	///
	/// For strategies without source maps the table is dropped and an empty
	/// one is used instead.
	pub fn from_table(
		root: impl Into<PathBuf>,
		strategy: ResolutionStrategy,
		table: SourceMapTable,
	) -> Self {
		let table = if strategy.uses_source_maps() {
			table
		} else {
			SourceMapTable::empty()
		};
		Self::from_parts(root.into(), strategy, table)
	}

	fn from_parts(root: PathBuf, strategy: ResolutionStrategy, table: SourceMapTable) -> Self {
		Self {
			inner: Arc::new(Inner {
				root,
				strategy,
				current: RwLock::new(Arc::new(table)),
				reload_lock: Mutex::new(()),
			}),
		}
	}

	/// The table as of now. Later reloads do not affect the returned value.
	pub fn snapshot(&self) -> Arc<SourceMapTable> {
		Arc::clone(&self.inner.current.read())
	}

	/// Rebuild from the compiled output directory and publish the result.
	///
	/// Returns the number of indexed maps.
	pub fn reload(&self) -> usize {
		if !self.is_enabled() {
			return 0;
		}

		let _serialized = self.inner.reload_lock.lock();

		let table = Arc::new(SourceMapTable::reload(&self.inner.root));
		let count = table.len();

		*self.inner.current.write() = table;

		info!(root = %self.inner.root.display(), count, "reloaded source maps");
		count
	}

	pub fn root(&self) -> &Path {
		&self.inner.root
	}

	pub fn strategy(&self) -> ResolutionStrategy {
		self.inner.strategy
	}

	/// Whether this handle ever scans for source maps.
	pub fn is_enabled(&self) -> bool {
		self.inner.strategy.uses_source_maps()
	}
}

impl std::fmt::Debug for SharedSourceMaps {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedSourceMaps")
			.field("root", &self.inner.root)
			.field("strategy", &self.inner.strategy)
			.field("maps", &self.snapshot().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const MAP: &str = r#"{"version": 3, "sources": ["App.kt"], "names": [], "mappings": "AAAA"}"#;

	#[test]
	fn test_disabled_strategy_skips_scan() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("app.mjs.map"), MAP).unwrap();

		let maps = SharedSourceMaps::load(dir.path(), ResolutionStrategy::JsOnly);

		assert!(!maps.is_enabled());
		assert!(maps.snapshot().is_empty());
		assert_eq!(maps.reload(), 0);
		assert!(maps.snapshot().is_empty());
	}

	#[test]
	fn test_reload_swaps_table() {
		let dir = TempDir::new().unwrap();
		let maps = SharedSourceMaps::load(dir.path(), ResolutionStrategy::KotlinPreferred);
		let before = maps.snapshot();
		assert!(before.is_empty());

		fs::write(dir.path().join("app.mjs.map"), MAP).unwrap();
		assert_eq!(maps.reload(), 1);

		assert!(before.is_empty(), "old snapshot must stay untouched");
		assert!(maps.snapshot().lookup("app").is_some());
	}

	#[test]
	fn test_from_table_follows_strategy() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("app.mjs.map"), MAP).unwrap();
		let table = SourceMapTable::build(dir.path());
		assert_eq!(table.len(), 1);

		let maps = SharedSourceMaps::from_table(dir.path(), ResolutionStrategy::None, table.clone());
		assert_eq!(maps.strategy(), ResolutionStrategy::None);
		assert!(maps.snapshot().is_empty());
		assert_eq!(maps.reload(), 0);

		let maps = SharedSourceMaps::from_table(dir.path(), ResolutionStrategy::KotlinOnly, table);
		assert!(maps.is_enabled());
		assert_eq!(maps.snapshot().len(), 1);
	}

	#[test]
	fn test_clones_share_table() {
		let dir = TempDir::new().unwrap();
		let maps = SharedSourceMaps::load(dir.path(), ResolutionStrategy::KotlinOnly);
		let other = maps.clone();

		fs::write(dir.path().join("app.mjs.map"), MAP).unwrap();
		other.reload();

		assert_eq!(maps.snapshot().len(), 1);
	}

	#[test]
	fn test_concurrent_reloads_and_reads() {
		let dir = TempDir::new().unwrap();
		fs::write(dir.path().join("app.mjs.map"), MAP).unwrap();
		let maps = SharedSourceMaps::load(dir.path(), ResolutionStrategy::KotlinPreferred);

		let handles: Vec<_> = (0..4)
			.map(|i| {
				let maps = maps.clone();
				std::thread::spawn(move || {
					for _ in 0..20 {
						if i % 2 == 0 {
							maps.reload();
						} else {
							assert_eq!(maps.snapshot().len(), 1);
						}
					}
				})
			})
			.collect();

		for handle in handles {
			handle.join().unwrap();
		}
		assert_eq!(maps.snapshot().len(), 1);
	}
}
