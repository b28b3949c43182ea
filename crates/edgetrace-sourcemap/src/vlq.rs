// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! VLQ (Variable-Length Quantity) codec for source map mappings.
//!
//! Source maps use Base64 VLQ encoding for compact storage of line/column mappings.
//! Decoding follows the Source Map v3 format; encoding is provided so fixtures can
//! be produced without a bundler.

use crate::error::{Result, SourceMapError};

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION_BIT: i64 = 0b100000;
const DIGIT_MASK: i64 = 0b011111;

/// Largest shift before a value no longer fits in an `i32`.
const MAX_SHIFT: u32 = 30;

fn decode_char(ch: u8) -> Result<i64> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as i64)
		.ok_or(SourceMapError::InvalidVlqChar(ch as char))
}

/// Decode one segment into its signed values: generated column, then
/// optionally source, original line, original column and name deltas.
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i32>> {
	let mut values = Vec::new();
	let mut value = 0i64;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		let digit = decode_char(ch)?;

		if shift > MAX_SHIFT {
			return Err(SourceMapError::InvalidMapping {
				line: 0,
				reason: "VLQ value overflows 32 bits",
			});
		}

		value += (digit & DIGIT_MASK) << shift;
		shift += 5;

		if digit & CONTINUATION_BIT == 0 {
			// Lowest bit carries the sign
			let negated = value & 1 != 0;
			let magnitude = value >> 1;
			let signed = if negated { -magnitude } else { magnitude };
			let signed = i32::try_from(signed).map_err(|_| SourceMapError::InvalidMapping {
				line: 0,
				reason: "VLQ value overflows 32 bits",
			})?;
			values.push(signed);
			value = 0;
			shift = 0;
		}
	}

	if shift != 0 {
		return Err(SourceMapError::InvalidMapping {
			line: 0,
			reason: "VLQ segment ends inside a value",
		});
	}

	Ok(values)
}

/// Encode signed integers as a single VLQ segment.
pub fn encode_vlq_segment(values: &[i32]) -> String {
	let mut out = String::new();

	for &value in values {
		let mut vlq = if value < 0 {
			((-(value as i64)) << 1) | 1
		} else {
			(value as i64) << 1
		};

		loop {
			let mut digit = vlq & DIGIT_MASK;
			vlq >>= 5;
			if vlq > 0 {
				digit |= CONTINUATION_BIT;
			}
			out.push(BASE64_CHARS[digit as usize] as char);
			if vlq == 0 {
				break;
			}
		}
	}

	out
}

/// One decoded segment with absolute, zero-based positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
	pub generated_line: u32,
	pub generated_column: u32,
	/// Position in `sources`.
	pub source_index: u32,
	pub original_line: u32,
	pub original_column: u32,
	/// Position in `names`, for segments that carry a symbol.
	pub name_index: Option<u32>,
}

/// Decoded mappings ordered by `(generated_line, generated_column)`.
///
/// Single-value segments start an unmapped range; they are kept as
/// `(line, column)` markers so lookups inside the range find nothing.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
	mappings: Vec<Mapping>,
	unmapped: Vec<(u32, u32)>,
}

impl DecodedMappings {
	pub fn new() -> Self {
		Self {
			mappings: Vec::new(),
			unmapped: Vec::new(),
		}
	}

	/// Build from mappings in any order.
	pub fn from_unsorted(mappings: Vec<Mapping>) -> Self {
		Self::with_unmapped(mappings, Vec::new())
	}

	/// Build from mappings and unmapped `(line, column)` markers in any order.
	pub fn with_unmapped(mut mappings: Vec<Mapping>, mut unmapped: Vec<(u32, u32)>) -> Self {
		mappings.sort_by_key(|m| (m.generated_line, m.generated_column));
		unmapped.sort_unstable();
		Self { mappings, unmapped }
	}

	/// Returns the closest mapping at or before `column` on `line`, or `None`
	/// when the line has no mapping that starts at or before the column, or
	/// when an unmapped segment starts between that mapping and the column.
	pub fn find(&self, line: u32, column: u32) -> Option<&Mapping> {
		let mapping = self.closest_mapping(line, column)?;

		match self.closest_unmapped(line, column) {
			Some(start) if start > mapping.generated_column => None,
			_ => Some(mapping),
		}
	}

	fn closest_unmapped(&self, line: u32, column: u32) -> Option<u32> {
		let idx = self.unmapped.partition_point(|&pos| pos <= (line, column));
		let (marker_line, marker_column) = *self.unmapped.get(idx.checked_sub(1)?)?;
		(marker_line == line).then_some(marker_column)
	}

	fn closest_mapping(&self, line: u32, column: u32) -> Option<&Mapping> {
		let line_start = self
			.mappings
			.partition_point(|m| m.generated_line < line);
		let line_end = self
			.mappings
			.partition_point(|m| m.generated_line <= line);

		if line_start >= line_end {
			return None;
		}

		let line_mappings = &self.mappings[line_start..line_end];
		let idx = line_mappings.partition_point(|m| m.generated_column <= column);

		if idx == 0 {
			None
		} else {
			Some(&line_mappings[idx - 1])
		}
	}

	/// Number of segments that map to a source.
	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}
}

fn to_u32(value: i32, line: u32, reason: &'static str) -> Result<u32> {
	u32::try_from(value).map_err(|_| SourceMapError::InvalidMapping { line, reason })
}

/// Decode a `mappings` field.
///
/// `;` ends a generated line and `,` separates segments on a line. Segments
/// with a single value map nothing and become unmapped markers.
pub fn decode_vlq_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut decoded = Vec::new();
	let mut unmapped = Vec::new();
	let mut generated_line = 0u32;

	// Everything except the generated column is delta-encoded across lines
	let mut prev_source = 0i32;
	let mut prev_original_line = 0i32;
	let mut prev_original_column = 0i32;
	let mut prev_name = 0i32;

	for line in mappings.split(';') {
		let mut generated_column = 0i32;

		for segment in line.split(',') {
			if segment.is_empty() {
				continue;
			}

			let values = decode_vlq_segment(segment).map_err(|e| match e {
				SourceMapError::InvalidMapping { reason, .. } => SourceMapError::InvalidMapping {
					line: generated_line,
					reason,
				},
				other => other,
			})?;

			if values.is_empty() {
				continue;
			}

			generated_column = generated_column.saturating_add(values[0]);

			if values.len() < 4 {
				unmapped.push((
					generated_line,
					to_u32(generated_column, generated_line, "negative generated column")?,
				));
			} else {
				prev_source = prev_source.saturating_add(values[1]);
				prev_original_line = prev_original_line.saturating_add(values[2]);
				prev_original_column = prev_original_column.saturating_add(values[3]);

				let name_index = if values.len() >= 5 {
					prev_name = prev_name.saturating_add(values[4]);
					Some(to_u32(prev_name, generated_line, "negative name index")?)
				} else {
					None
				};

				decoded.push(Mapping {
					generated_line,
					generated_column: to_u32(
						generated_column,
						generated_line,
						"negative generated column",
					)?,
					source_index: to_u32(prev_source, generated_line, "negative source index")?,
					original_line: to_u32(
						prev_original_line,
						generated_line,
						"negative original line",
					)?,
					original_column: to_u32(
						prev_original_column,
						generated_line,
						"negative original column",
					)?,
					name_index,
				});
			}
		}

		generated_line += 1;
	}

	Ok(DecodedMappings::with_unmapped(decoded, unmapped))
}
