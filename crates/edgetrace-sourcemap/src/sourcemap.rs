// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map parsing and position lookup.
//!
//! Implements the Source Map v3 format as emitted by the Kotlin/JS compiler
//! next to each generated `.mjs` file.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, SourceMapError};
use crate::vlq::{decode_vlq_mappings, DecodedMappings};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	version: u32,
	#[serde(default)]
	file: Option<String>,
	#[serde(default)]
	source_root: Option<String>,
	sources: Vec<Option<String>>,
	#[serde(default)]
	names: Vec<String>,
	mappings: String,
}

/// A decoded v3 source map.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	/// Generated file name, if recorded.
	pub file: Option<String>,
	/// `sourceRoot`, joined in front of each source on resolve.
	pub source_root: Option<String>,
	/// Original source file paths. `null` entries are kept as empty strings.
	pub sources: Vec<String>,
	pub names: Vec<String>,
	mappings: DecodedMappings,
}

/// Original position returned by [`ParsedSourceMap::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
	/// Original source path with `sourceRoot` applied.
	pub source: String,
	/// Original line as stored in the map.
	pub line: u32,
	/// Original column as stored in the map.
	pub column: u32,
	/// Original identifier, if the mapping names one.
	pub name: Option<String>,
}

impl ParsedSourceMap {
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let raw: RawSourceMap = serde_json::from_slice(data)?;

		if raw.version != 3 {
			return Err(SourceMapError::InvalidSourceMapVersion(raw.version));
		}

		let mappings = decode_vlq_mappings(&raw.mappings)?;

		Ok(Self {
			file: raw.file,
			source_root: raw.source_root,
			sources: raw.sources.into_iter().map(Option::unwrap_or_default).collect(),
			names: raw.names,
			mappings,
		})
	}

	/// Resolve a generated position to its original position.
	///
	/// `line` and `column` are compared directly against the decoded mapping
	/// table. Returns `None` when nothing is mapped at or before the column on
	/// that line, or when the mapping points outside `sources`.
	pub fn resolve(&self, line: u32, column: u32) -> Option<OriginalPosition> {
		let mapping = self.mappings.find(line, column)?;

		let source = self.sources.get(mapping.source_index as usize)?;
		let name = mapping
			.name_index
			.and_then(|idx| self.names.get(idx as usize).cloned());

		Some(OriginalPosition {
			source: self.resolve_source_path(source),
			line: mapping.original_line,
			column: mapping.original_column,
			name,
		})
	}

	fn resolve_source_path(&self, source: &str) -> String {
		match &self.source_root {
			Some(root) if !root.is_empty() && !source.is_empty() => {
				let root = root.trim_end_matches('/');
				format!("{}/{}", root, source)
			}
			_ => source.to_string(),
		}
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}

	pub fn name_count(&self) -> usize {
		self.names.len()
	}

	/// Decoded segments that map to a source.
	pub fn mapping_count(&self) -> usize {
		self.mappings.len()
	}
}

impl FromStr for ParsedSourceMap {
	type Err = SourceMapError;

	fn from_str(s: &str) -> Result<Self> {
		Self::from_bytes(s.as_bytes())
	}
}
