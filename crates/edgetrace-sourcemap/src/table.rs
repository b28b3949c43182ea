// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Index of the source maps found under a compiled output directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SourceMapError};
use crate::sourcemap::{OriginalPosition, ParsedSourceMap};

/// Suffix of the map files written next to each compiled module.
pub const MAP_FILE_SUFFIX: &str = ".mjs.map";

/// Extensions stripped from a generated file name before lookup.
const COMPILED_EXTENSIONS: &[&str] = &[".mjs", ".js"];

/// One parsed source map for one compiled output file.
#[derive(Debug, Clone)]
pub struct SourceMapEntry {
	/// Compiled file name without extension, e.g. `app` for `app.mjs`.
	pub compiled_name: String,
	pub map: ParsedSourceMap,
	/// Location of the `.mjs.map` file; sources resolve relative to its directory.
	pub map_file: PathBuf,
}

impl SourceMapEntry {
	/// Read and parse a map file.
	pub fn load(map_file: &Path) -> Result<Self> {
		let compiled_name = compiled_name_of(map_file).ok_or_else(|| {
			SourceMapError::io(
				map_file,
				std::io::Error::new(
					std::io::ErrorKind::InvalidInput,
					format!("file name does not end with {MAP_FILE_SUFFIX}"),
				),
			)
		})?;

		let data = std::fs::read(map_file).map_err(|e| SourceMapError::io(map_file, e))?;
		let map = ParsedSourceMap::from_bytes(&data)?;

		Ok(Self {
			compiled_name,
			map,
			map_file: map_file.to_path_buf(),
		})
	}

	pub fn resolve(&self, line: u32, column: u32) -> Option<OriginalPosition> {
		self.map.resolve(line, column)
	}

	/// Directory containing the map file.
	pub fn map_dir(&self) -> &Path {
		self.map_file.parent().unwrap_or_else(|| Path::new("."))
	}

	/// Resolve a source reference from this map to a filesystem path.
	pub fn source_path(&self, source: &str) -> PathBuf {
		self.map_dir().join(source)
	}
}

/// Compiled name for a map file path, or `None` if it is not a map file.
pub fn compiled_name_of(map_file: &Path) -> Option<String> {
	let file_name = map_file.file_name()?.to_str()?;
	let name = file_name.strip_suffix(MAP_FILE_SUFFIX)?;
	if name.is_empty() {
		return None;
	}
	Some(name.to_string())
}

/// Name-keyed snapshot of every source map under a directory.
#[derive(Debug, Clone, Default)]
pub struct SourceMapTable {
	entries: HashMap<String, SourceMapEntry>,
}

impl SourceMapTable {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Scan `root` recursively and index every readable map file.
	///
	/// A missing root yields an empty table. Maps that cannot be read or
	/// parsed are skipped so the rest of the table stays usable.
	pub fn build(root: &Path) -> Self {
		let mut table = Self::empty();

		if !root.is_dir() {
			debug!(root = %root.display(), "compiled output directory not found, no source maps indexed");
			return table;
		}

		for entry in WalkDir::new(root).sort_by_file_name() {
			let entry = match entry {
				Ok(entry) => entry,
				Err(e) => {
					warn!(root = %root.display(), error = %e, "failed to walk compiled output");
					continue;
				}
			};

			if !entry.file_type().is_file() || compiled_name_of(entry.path()).is_none() {
				continue;
			}

			match SourceMapEntry::load(entry.path()) {
				Ok(map_entry) => table.insert(map_entry),
				Err(e) => {
					warn!(path = %entry.path().display(), error = %e, "skipping unreadable source map");
				}
			}
		}

		info!(root = %root.display(), count = table.len(), "indexed source maps");
		table
	}

	/// Rebuild from the current state of `root`.
	pub fn reload(root: &Path) -> Self {
		Self::build(root)
	}

	/// Add an entry unless one with the same compiled name exists.
	pub fn insert(&mut self, entry: SourceMapEntry) {
		if let Some(existing) = self.entries.get(&entry.compiled_name) {
			warn!(
				name = %entry.compiled_name,
				kept = %existing.map_file.display(),
				ignored = %entry.map_file.display(),
				"duplicate source map name"
			);
			return;
		}
		self.entries.insert(entry.compiled_name.clone(), entry);
	}

	/// Look up by compiled name. `app`, `app.mjs` and `app.js` all find `app`.
	pub fn lookup(&self, compiled_name: &str) -> Option<&SourceMapEntry> {
		let key = COMPILED_EXTENSIONS
			.iter()
			.find_map(|ext| compiled_name.strip_suffix(ext))
			.unwrap_or(compiled_name);
		self.entries.get(key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries sorted by compiled name.
	pub fn entries(&self) -> Vec<&SourceMapEntry> {
		let mut entries: Vec<_> = self.entries.values().collect();
		entries.sort_by(|a, b| a.compiled_name.cmp(&b.compiled_name));
		entries
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const MAP: &str = r#"{"version": 3, "sources": ["App.kt"], "names": [], "mappings": "AAAA"}"#;

	fn write(path: &Path, content: &str) {
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, content).unwrap();
	}

	#[test]
	fn test_compiled_name_of() {
		assert_eq!(
			compiled_name_of(Path::new("/out/app.mjs.map")).as_deref(),
			Some("app")
		);
		assert_eq!(
			compiled_name_of(Path::new("kotlin-kotlin-stdlib.mjs.map")).as_deref(),
			Some("kotlin-kotlin-stdlib")
		);
		assert_eq!(compiled_name_of(Path::new("/out/app.js.map")), None);
		assert_eq!(compiled_name_of(Path::new("/out/app.mjs")), None);
		assert_eq!(compiled_name_of(Path::new("/out/.mjs.map")), None);
	}

	#[test]
	fn test_build_scans_recursively() {
		let dir = TempDir::new().unwrap();
		write(&dir.path().join("app.mjs.map"), MAP);
		write(&dir.path().join("nested/deeper/lib.mjs.map"), MAP);
		write(&dir.path().join("app.mjs"), "export {}");
		write(&dir.path().join("other.js.map"), MAP);

		let table = SourceMapTable::build(dir.path());

		assert_eq!(table.len(), 2);
		assert!(table.lookup("app").is_some());
		let lib = table.lookup("lib").unwrap();
		assert_eq!(lib.map_dir(), dir.path().join("nested/deeper"));
	}

	#[test]
	fn test_lookup_strips_compiled_extension() {
		let dir = TempDir::new().unwrap();
		write(&dir.path().join("app.mjs.map"), MAP);
		let table = SourceMapTable::build(dir.path());

		assert!(table.lookup("app.mjs").is_some());
		assert!(table.lookup("app.js").is_some());
		assert!(table.lookup("app.kt").is_none());
		assert!(table.lookup("missing").is_none());
	}

	#[test]
	fn test_build_skips_corrupt_maps() {
		let dir = TempDir::new().unwrap();
		write(&dir.path().join("good.mjs.map"), MAP);
		write(&dir.path().join("bad.mjs.map"), "{ this is not json");
		write(
			&dir.path().join("old.mjs.map"),
			r#"{"version": 2, "sources": [], "names": [], "mappings": ""}"#,
		);

		let table = SourceMapTable::build(dir.path());

		assert_eq!(table.len(), 1);
		assert!(table.lookup("good").is_some());
		assert!(table.lookup("bad").is_none());
	}

	#[test]
	fn test_build_missing_root_is_empty() {
		let dir = TempDir::new().unwrap();
		let table = SourceMapTable::build(&dir.path().join("not-compiled-yet"));
		assert!(table.is_empty());
	}

	#[test]
	fn test_duplicate_names_keep_first() {
		let dir = TempDir::new().unwrap();
		write(&dir.path().join("a/app.mjs.map"), MAP);
		write(&dir.path().join("b/app.mjs.map"), MAP);

		let table = SourceMapTable::build(dir.path());

		assert_eq!(table.len(), 1);
		assert_eq!(table.lookup("app").unwrap().map_dir(), dir.path().join("a"));
	}

	#[test]
	fn test_reload_sees_new_files() {
		let dir = TempDir::new().unwrap();
		write(&dir.path().join("app.mjs.map"), MAP);
		let before = SourceMapTable::build(dir.path());

		write(&dir.path().join("extra.mjs.map"), MAP);
		let after = SourceMapTable::reload(dir.path());

		assert_eq!(before.len(), 1);
		assert_eq!(after.len(), 2);
	}

	#[test]
	fn test_source_path_is_relative_to_map_dir() {
		let dir = TempDir::new().unwrap();
		let map_file = dir.path().join("out/app.mjs.map");
		write(&map_file, MAP);

		let entry = SourceMapEntry::load(&map_file).unwrap();
		assert_eq!(
			entry.source_path("../src/App.kt"),
			dir.path().join("out").join("../src/App.kt")
		);
	}

	#[test]
	fn test_entries_sorted() {
		let dir = TempDir::new().unwrap();
		write(&dir.path().join("zeta.mjs.map"), MAP);
		write(&dir.path().join("alpha.mjs.map"), MAP);

		let table = SourceMapTable::build(dir.path());
		let names: Vec<_> = table.entries().iter().map(|e| e.compiled_name.as_str()).collect();
		assert_eq!(names, vec!["alpha", "zeta"]);
	}
}
