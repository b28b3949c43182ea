// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map indexing for Kotlin/JS edge function output.
//!
//! This crate provides:
//! - Source map v3 parsing and VLQ decoding
//! - Position lookup from generated `.mjs` coordinates to Kotlin sources
//! - A name-keyed [`SourceMapTable`] built by scanning a compiled output tree
//!
//! # Example
//!
//! ```
//! use edgetrace_sourcemap::ParsedSourceMap;
//!
//! let map: ParsedSourceMap = r#"{
//!     "version": 3,
//!     "sources": ["../src/jsMain/kotlin/App.kt"],
//!     "names": ["serve"],
//!     "mappings": "AAAAA"
//! }"#
//! .parse()
//! .unwrap();
//!
//! let position = map.resolve(0, 4).unwrap();
//! assert_eq!(position.source, "../src/jsMain/kotlin/App.kt");
//! assert_eq!(position.name.as_deref(), Some("serve"));
//! ```

pub mod error;
pub mod sourcemap;
pub mod table;
pub mod vlq;

pub use error::{Result, SourceMapError};
pub use sourcemap::{OriginalPosition, ParsedSourceMap};
pub use table::{compiled_name_of, SourceMapEntry, SourceMapTable, MAP_FILE_SUFFIX};
pub use vlq::{decode_vlq_mappings, decode_vlq_segment, encode_vlq_segment, DecodedMappings, Mapping};
