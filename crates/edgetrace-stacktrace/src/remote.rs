// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translation of edge runtime file URLs into local paths.

use std::path::Path;

/// Root of function files inside the edge runtime container on older
/// Supabase CLI releases. It corresponds to the local Supabase directory.
pub const LEGACY_RUNTIME_ROOT: &str = "file:///home/deno";

/// Prefix of absolute file URLs on current Supabase CLI releases, which mount
/// the project at its host path.
pub const FILE_URL_PREFIX: &str = "file:///";

/// Turn a runtime location into a local one, keeping any `:line:column` suffix.
///
/// Locations that are not file URLs are returned unchanged.
pub fn to_local_location(remote: &str, supabase_dir: &Path) -> String {
	if let Some(rest) = remote.strip_prefix(LEGACY_RUNTIME_ROOT) {
		let base = supabase_dir.to_string_lossy();
		return format!("{}{}", base.trim_end_matches('/'), rest);
	}

	if let Some(rest) = remote.strip_prefix(FILE_URL_PREFIX) {
		return format!("/{rest}");
	}

	remote.to_string()
}

/// The file part of a local location: everything before the first `:`.
pub fn local_file_part(location: &str) -> &str {
	location.split(':').next().unwrap_or(location)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_legacy_location() {
		assert_eq!(
			to_local_location(
				"file:///home/deno/app/index.js:3:1",
				Path::new("/home/project/supabase")
			),
			"/home/project/supabase/app/index.js:3:1"
		);
	}

	#[test]
	fn test_legacy_location_with_trailing_slash_base() {
		assert_eq!(
			to_local_location(
				"file:///home/deno/functions/app/index.mjs:1:1",
				Path::new("/srv/supabase/")
			),
			"/srv/supabase/functions/app/index.mjs:1:1"
		);
	}

	#[test]
	fn test_current_location() {
		assert_eq!(
			to_local_location(
				"file:///Users/me/project/supabase/functions/app/index.mjs:12:9",
				Path::new("/ignored")
			),
			"/Users/me/project/supabase/functions/app/index.mjs:12:9"
		);
	}

	#[test]
	fn test_non_file_location_unchanged() {
		assert_eq!(
			to_local_location("ext:core/01_core.js:10:2", Path::new("/base")),
			"ext:core/01_core.js:10:2"
		);
		assert_eq!(to_local_location("<anonymous>", Path::new("/base")), "<anonymous>");
	}

	#[test]
	fn test_local_file_part() {
		assert_eq!(local_file_part("/srv/app/index.mjs:3:1"), "/srv/app/index.mjs");
		assert_eq!(local_file_part("/srv/app/index.mjs"), "/srv/app/index.mjs");
		assert_eq!(local_file_part(""), "");
	}
}
