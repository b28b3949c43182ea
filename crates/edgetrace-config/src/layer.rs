// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;
use std::path::PathBuf;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub stacktrace: Option<StacktraceLayer>,
	#[serde(default)]
	pub watch: Option<WatchLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StacktraceLayer {
	#[serde(default)]
	pub strategy: Option<String>,
	#[serde(default)]
	pub compiled_dir: Option<PathBuf>,
	#[serde(default)]
	pub supabase_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.stacktrace, other.stacktrace, StacktraceLayer::merge);
		merge_option(&mut self.watch, other.watch, WatchLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}

	pub fn stacktrace_mut(&mut self) -> &mut StacktraceLayer {
		self.stacktrace.get_or_insert_with(StacktraceLayer::default)
	}

	pub fn watch_mut(&mut self) -> &mut WatchLayer {
		self.watch.get_or_insert_with(WatchLayer::default)
	}

	pub fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

fn overwrite<T>(target: &mut Option<T>, source: Option<T>) {
	if source.is_some() {
		*target = source;
	}
}

impl StacktraceLayer {
	fn merge(&mut self, other: StacktraceLayer) {
		overwrite(&mut self.strategy, other.strategy);
		overwrite(&mut self.compiled_dir, other.compiled_dir);
		overwrite(&mut self.supabase_dir, other.supabase_dir);
	}
}

impl WatchLayer {
	fn merge(&mut self, other: WatchLayer) {
		overwrite(&mut self.enabled, other.enabled);
		overwrite(&mut self.debounce_ms, other.debounce_ms);
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		overwrite(&mut self.level, other.level);
		overwrite(&mut self.format, other.format);
	}
}
