// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StackTraceError;

/// Which locations a stack frame may be resolved to, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
	/// Never resolve; every location becomes `Unknown Source`.
	None,
	/// Resolve to the local copy of the generated JavaScript only.
	#[default]
	JsOnly,
	/// Resolve through source maps only. Unmapped frames are not sent to the
	/// JavaScript path.
	KotlinOnly,
	/// Resolve through source maps, falling back to the JavaScript path.
	KotlinPreferred,
}

/// What happens once source map resolution has been ruled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
	/// Try the local JavaScript file.
	JsPath,
	/// Replace the location with `Unknown Source`.
	UnknownSource,
}

impl ResolutionStrategy {
	pub const ALL: [ResolutionStrategy; 4] = [
		Self::None,
		Self::JsOnly,
		Self::KotlinOnly,
		Self::KotlinPreferred,
	];

	/// Whether frames are looked up in the source map table.
	pub fn uses_source_maps(self) -> bool {
		match self {
			Self::None | Self::JsOnly => false,
			Self::KotlinOnly | Self::KotlinPreferred => true,
		}
	}

	/// Where a frame goes when it cannot be (or is not) resolved through a
	/// source map.
	pub fn fallback(self) -> Fallback {
		match self {
			Self::JsOnly | Self::KotlinPreferred => Fallback::JsPath,
			Self::None | Self::KotlinOnly => Fallback::UnknownSource,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::JsOnly => "js-only",
			Self::KotlinOnly => "kotlin-only",
			Self::KotlinPreferred => "kotlin-preferred",
		}
	}
}

impl fmt::Display for ResolutionStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResolutionStrategy {
	type Err = StackTraceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
			"none" => Ok(Self::None),
			"js-only" | "jsonly" => Ok(Self::JsOnly),
			"kotlin-only" | "kotlinonly" => Ok(Self::KotlinOnly),
			"kotlin-preferred" | "kotlinpreferred" => Ok(Self::KotlinPreferred),
			_ => Err(StackTraceError::InvalidStrategy(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decision_table() {
		use Fallback::*;
		use ResolutionStrategy::*;

		let table = [
			(None, false, UnknownSource),
			(JsOnly, false, JsPath),
			(KotlinOnly, true, UnknownSource),
			(KotlinPreferred, true, JsPath),
		];

		for (strategy, maps, fallback) in table {
			assert_eq!(strategy.uses_source_maps(), maps, "{strategy}");
			assert_eq!(strategy.fallback(), fallback, "{strategy}");
		}
	}

	#[test]
	fn test_parse_round_trips_display() {
		for strategy in ResolutionStrategy::ALL {
			assert_eq!(strategy.to_string().parse::<ResolutionStrategy>(), Ok(strategy));
		}
	}

	#[test]
	fn test_parse_accepts_enum_spelling() {
		assert_eq!(
			"KotlinPreferred".parse::<ResolutionStrategy>(),
			Ok(ResolutionStrategy::KotlinPreferred)
		);
		assert_eq!(
			"kotlin_only".parse::<ResolutionStrategy>(),
			Ok(ResolutionStrategy::KotlinOnly)
		);
	}

	#[test]
	fn test_parse_rejects_unknown() {
		assert_eq!(
			"kotlin".parse::<ResolutionStrategy>(),
			Err(StackTraceError::InvalidStrategy("kotlin".to_string()))
		);
	}

	#[test]
	fn test_serde_names() {
		let json = serde_json::to_string(&ResolutionStrategy::KotlinPreferred).unwrap();
		assert_eq!(json, "\"kotlin-preferred\"");
		let parsed: ResolutionStrategy = serde_json::from_str("\"js-only\"").unwrap();
		assert_eq!(parsed, ResolutionStrategy::JsOnly);
	}

	#[test]
	fn test_default_is_js_only() {
		assert_eq!(ResolutionStrategy::default(), ResolutionStrategy::JsOnly);
	}
}
