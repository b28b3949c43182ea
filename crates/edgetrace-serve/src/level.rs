// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log level detection for edge runtime output.
//!
//! The runtime prefixes function output with `[Info] ` or `[Error] `. A tag
//! applies to the tagged line and every untagged line after it, which is how
//! multi-line errors and their stack frames keep the level of their header.

use serde::{Deserialize, Serialize};

/// Level of a line of runtime output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServeLevel {
	#[default]
	Info,
	Error,
}

impl ServeLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			ServeLevel::Info => "info",
			ServeLevel::Error => "error",
		}
	}

	fn from_tag(tag: &str) -> Self {
		match tag {
			"Error" => ServeLevel::Error,
			_ => ServeLevel::Info,
		}
	}
}

impl std::fmt::Display for ServeLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Request failures reported by the runtime itself start with this word.
const ERROR_PREFIX: &str = "Error";

/// Tracks the sticky level across lines.
#[derive(Debug, Default)]
pub struct LevelTagger {
	current: ServeLevel,
}

impl LevelTagger {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn current(&self) -> ServeLevel {
		self.current
	}

	/// Update the level from `line` and return the level with the line text.
	///
	/// A `[Tag]` prefix plus the character after it is removed. A prefix
	/// with nothing after it leaves the line as is.
	pub fn tag<'a>(&mut self, line: &'a str) -> (ServeLevel, &'a str) {
		let text = match split_tag(line) {
			Some((tag, rest)) => {
				self.current = ServeLevel::from_tag(tag);
				rest
			}
			None => line,
		};

		if text.starts_with(ERROR_PREFIX) {
			self.current = ServeLevel::Error;
		}

		(self.current, text)
	}
}

fn split_tag(line: &str) -> Option<(&str, &str)> {
	let inner = line.strip_prefix('[')?;
	let end = inner.find(']')?;
	if end == 0 {
		return None;
	}

	let tag = &inner[..end];
	let after = &inner[end + 1..];
	let mut chars = after.chars();

	let rest = match chars.next() {
		Some(_) => chars.as_str(),
		None => line,
	};
	Some((tag, rest))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tags_set_level_and_are_stripped() {
		let mut tagger = LevelTagger::new();

		assert_eq!(tagger.tag("[Info] serving"), (ServeLevel::Info, "serving"));
		assert_eq!(tagger.tag("[Error] boom"), (ServeLevel::Error, "boom"));
		assert_eq!(tagger.tag("[Warning] hmm"), (ServeLevel::Info, "hmm"));
	}

	#[test]
	fn test_level_is_sticky() {
		let mut tagger = LevelTagger::new();

		tagger.tag("[Error] TypeError: x is undefined");
		assert_eq!(
			tagger.tag("    at handler (index.mjs:1:1)"),
			(ServeLevel::Error, "    at handler (index.mjs:1:1)")
		);
		assert_eq!(tagger.current(), ServeLevel::Error);

		tagger.tag("[Info] ok");
		assert_eq!(tagger.tag("next"), (ServeLevel::Info, "next"));
	}

	#[test]
	fn test_runtime_error_line_switches_level() {
		let mut tagger = LevelTagger::new();

		assert_eq!(
			tagger.tag("Error: worker boot error"),
			(ServeLevel::Error, "Error: worker boot error")
		);
		assert_eq!(tagger.tag("details"), (ServeLevel::Error, "details"));
	}

	#[test]
	fn test_malformed_tags_are_left_alone() {
		let mut tagger = LevelTagger::new();

		assert_eq!(tagger.tag("[] empty"), (ServeLevel::Info, "[] empty"));
		assert_eq!(tagger.tag("[unterminated"), (ServeLevel::Info, "[unterminated"));
		assert_eq!(tagger.tag(" [Error] indented"), (ServeLevel::Info, " [Error] indented"));
	}

	#[test]
	fn test_tag_without_text_keeps_line() {
		let mut tagger = LevelTagger::new();
		assert_eq!(tagger.tag("[Error]"), (ServeLevel::Error, "[Error]"));
	}

	#[test]
	fn test_multibyte_separator() {
		let mut tagger = LevelTagger::new();
		assert_eq!(tagger.tag("[Info]\u{a0}text"), (ServeLevel::Info, "text"));
	}

	#[test]
	fn test_serde_names() {
		assert_eq!(serde_json::to_string(&ServeLevel::Error).unwrap(), "\"error\"");
		assert_eq!(ServeLevel::Info.to_string(), "info");
	}
}
