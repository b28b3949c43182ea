// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `edgetrace maps`: list the source maps found in the compiled output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use edgetrace_sourcemap::SourceMapTable;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MapSummary {
	pub name: String,
	pub map_file: PathBuf,
	pub sources: usize,
	pub mappings: usize,
}

pub fn summarize(table: &SourceMapTable) -> Vec<MapSummary> {
	table
		.entries()
		.into_iter()
		.map(|entry| MapSummary {
			name: entry.compiled_name.clone(),
			map_file: entry.map_file.clone(),
			sources: entry.map.source_count(),
			mappings: entry.map.mapping_count(),
		})
		.collect()
}

pub fn render_table(summaries: &[MapSummary]) -> String {
	let mut out = format!("{:<32} {:>8} {:>10}  {}\n", "NAME", "SOURCES", "MAPPINGS", "MAP FILE");
	for summary in summaries {
		out.push_str(&format!(
			"{:<32} {:>8} {:>10}  {}\n",
			summary.name,
			summary.sources,
			summary.mappings,
			summary.map_file.display()
		));
	}
	out
}

/// Scans regardless of strategy so the listing is available for every setup.
pub fn run(compiled_dir: &Path, json: bool) -> Result<()> {
	let table = SourceMapTable::build(compiled_dir);
	let summaries = summarize(&table);

	if json {
		let text = serde_json::to_string_pretty(&summaries).context("failed to encode maps")?;
		println!("{text}");
	} else if summaries.is_empty() {
		println!("No source maps found in {}", compiled_dir.display());
	} else {
		print!("{}", render_table(&summaries));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn test_summarize_and_render() {
		let dir = TempDir::new().unwrap();
		fs::write(
			dir.path().join("app.mjs.map"),
			r#"{"version": 3, "sources": ["A.kt", "B.kt"], "names": [], "mappings": "AAAA,CAAC;AACA"}"#,
		)
		.unwrap();

		let table = SourceMapTable::build(dir.path());
		let summaries = summarize(&table);

		assert_eq!(summaries.len(), 1);
		assert_eq!(summaries[0].name, "app");
		assert_eq!(summaries[0].sources, 2);
		assert_eq!(summaries[0].mappings, 3);

		let rendered = render_table(&summaries);
		assert!(rendered.starts_with("NAME"));
		assert!(rendered.lines().nth(1).unwrap().starts_with("app "));
	}

	#[test]
	fn test_summarize_empty() {
		let table = SourceMapTable::build(Path::new("/nonexistent/compiled"));
		assert!(summarize(&table).is_empty());
	}
}
