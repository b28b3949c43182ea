// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frame rewriting.
//!
//! [`TraceRewriter::rewrite`] is total: every input produces an output line and
//! nothing panics. Each step that cannot complete degrades to a less precise
//! location, ending at `Unknown Source`.

use std::path::{Path, PathBuf};

use edgetrace_sourcemap::{OriginalPosition, SourceMapEntry, SourceMapTable};
use tracing::trace;

use crate::frame::{is_frame_line, normalize_bare_frame, remote_location, replace_location, Frame};
use crate::remote::{local_file_part, to_local_location};
use crate::shared::SharedSourceMaps;
use crate::strategy::{Fallback, ResolutionStrategy};

/// Location written when a frame cannot be resolved to a local file.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Rewrites Deno stack frames to point at local files.
#[derive(Debug, Clone)]
pub struct TraceRewriter {
	maps: SharedSourceMaps,
	strategy: ResolutionStrategy,
	supabase_dir: PathBuf,
}

impl TraceRewriter {
	/// `supabase_dir` replaces the legacy `file:///home/deno` runtime root.
	/// A relative directory is resolved against the working directory.
	///
	/// The strategy is the one `maps` was loaded with.
	pub fn new(maps: SharedSourceMaps, supabase_dir: impl Into<PathBuf>) -> Self {
		Self {
			strategy: maps.strategy(),
			maps,
			supabase_dir: supabase_dir.into(),
		}
	}

	pub fn strategy(&self) -> ResolutionStrategy {
		self.strategy
	}

	pub fn maps(&self) -> &SharedSourceMaps {
		&self.maps
	}

	pub fn supabase_dir(&self) -> &Path {
		&self.supabase_dir
	}

	/// Rewrite one output line against the current source map table.
	///
	/// Lines that are not stack frames are returned unchanged.
	pub fn rewrite(&self, line: &str) -> String {
		if !is_frame_line(line) {
			return line.to_string();
		}

		let table = self.maps.snapshot();
		self.rewrite_with(&table, line)
	}

	/// Rewrite one output line against an explicit table snapshot.
	pub fn rewrite_with(&self, table: &SourceMapTable, line: &str) -> String {
		if !is_frame_line(line) {
			return line.to_string();
		}

		if !self.strategy.uses_source_maps() {
			return self.resolve_js(line);
		}

		let normalized = normalize_bare_frame(line);
		self.resolve_mapped(table, &normalized)
	}

	/// Point the frame at the local copy of the generated file.
	fn resolve_js(&self, line: &str) -> String {
		if self.strategy.fallback() == Fallback::UnknownSource {
			return unknown_source(line);
		}

		let Some(remote) = remote_location(line) else {
			return line.to_string();
		};

		let local = to_local_location(remote, &self.supabase_dir);
		let file = Path::new(local_file_part(&local));

		if !file.is_file() {
			trace!(location = %local, "generated file not found locally");
			return unknown_source(line);
		}

		replace_location(line, &local).unwrap_or_else(|| line.to_string())
	}

	/// Point the frame at the original source through the source map table.
	fn resolve_mapped(&self, table: &SourceMapTable, line: &str) -> String {
		let frame = match Frame::parse(line) {
			Ok(frame) => frame,
			Err(e) => {
				trace!(error = %e, "not a parsable frame");
				return self.resolve_js(line);
			}
		};

		let location = match frame.file_location() {
			Ok(location) => location,
			Err(e) => {
				trace!(error = %e, "frame location has no coordinates");
				return self.resolve_js(line);
			}
		};

		let Some(entry) = table.lookup(location.file_name) else {
			trace!(file = location.file_name, "no source map for generated file");
			return self.resolve_js(line);
		};

		let Some((position, offset)) = resolve_with_retry(entry, location.line, location.column)
		else {
			trace!(
				file = location.file_name,
				line = location.line,
				column = location.column,
				"no mapping for position"
			);
			return self.resolve_js(line);
		};

		let source_line = position.line.saturating_add(offset);
		let source_path = entry.source_path(&position.source);
		let has_source = !position.source.trim().is_empty();

		if !has_source || !source_path.is_file() {
			return match self.strategy.fallback() {
				Fallback::JsPath => self.resolve_js(line),
				Fallback::UnknownSource => {
					let file_name = if has_source {
						source_path
							.file_name()
							.map(|name| name.to_string_lossy().into_owned())
							.unwrap_or_default()
					} else {
						String::new()
					};

					if file_name.trim().is_empty() {
						unknown_source(line)
					} else {
						replace_location(line, &format!("{file_name}:{source_line}"))
							.unwrap_or_else(|| line.to_string())
					}
				}
			};
		}

		let canonical = std::fs::canonicalize(&source_path).unwrap_or(source_path);
		let resolved = format!("{}:{}", canonical.display(), source_line);

		match symbol_name(&position) {
			Some(symbol) => format!("at {symbol} ({resolved})"),
			None => replace_location(line, &resolved).unwrap_or_else(|| line.to_string()),
		}
	}
}

/// Look up `(line, column)`, then `(line - 1, column - 1)`.
///
/// The second lookup compensates for the runtime reporting one-based
/// coordinates; its result carries an offset of 1 to add to the source line.
fn resolve_with_retry(
	entry: &SourceMapEntry,
	line: u32,
	column: u32,
) -> Option<(OriginalPosition, u32)> {
	if let Some(position) = entry.resolve(line, column) {
		return Some((position, 0));
	}

	let line = line.checked_sub(1)?;
	let column = column.checked_sub(1)?;
	entry.resolve(line, column).map(|position| (position, 1))
}

fn symbol_name(position: &OriginalPosition) -> Option<&str> {
	position
		.name
		.as_deref()
		.filter(|name| !name.trim().is_empty() && *name != "null")
}

fn unknown_source(line: &str) -> String {
	replace_location(line, UNKNOWN_SOURCE).unwrap_or_else(|| line.to_string())
}
