// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tokenizer for Deno stack frame lines.
//!
//! A frame looks like `    at handler (file:///home/deno/functions/app/index.mjs:10:5)`.
//! Some frames carry no parenthesized location at all (`at async Promise.all`),
//! and some carry a location that is not a file (`at foo (<anonymous>)`).

use std::borrow::Cow;

use crate::error::FrameParseError;

/// Marker that starts every frame once leading whitespace is removed.
pub const FRAME_MARKER: &str = "at ";

/// Whether a line is a stack frame.
pub fn is_frame_line(line: &str) -> bool {
	line.trim().starts_with(FRAME_MARKER)
}

/// A stack frame split into its named parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
	/// Whitespace before `at `.
	pub indent: &'a str,
	/// Text between `at ` and the location, trimmed. Empty for `at (file:1:2)`.
	pub description: &'a str,
	/// Text inside the trailing parentheses, if any.
	pub location: Option<&'a str>,
}

impl<'a> Frame<'a> {
	pub fn parse(line: &'a str) -> Result<Self, FrameParseError> {
		if !is_frame_line(line) {
			return Err(FrameParseError::NotAFrame);
		}

		let body = line.trim_start();
		let indent = &line[..line.len() - body.len()];
		let rest = body[FRAME_MARKER.len()..].trim_end();

		let location_span = rest
			.rfind(')')
			.and_then(|close| rest[..close].rfind('(').map(|open| (open, close)));

		match location_span {
			Some((open, close)) => Ok(Self {
				indent,
				description: rest[..open].trim(),
				location: Some(&rest[open + 1..close]),
			}),
			None => Ok(Self {
				indent,
				description: rest.trim(),
				location: None,
			}),
		}
	}

	/// The file location, parsed into path and coordinates.
	pub fn file_location(&self) -> Result<FrameLocation<'a>, FrameParseError> {
		let location = self.location.ok_or(FrameParseError::MissingLocation)?;
		FrameLocation::parse(location)
	}
}

/// `path:line:column` taken from a frame location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLocation<'a> {
	/// Location without the trailing `:line:column`.
	pub path: &'a str,
	/// Last path segment, e.g. `index.mjs`.
	pub file_name: &'a str,
	pub line: u32,
	pub column: u32,
}

impl<'a> FrameLocation<'a> {
	/// Coordinates are split from the right so paths containing `:` still parse.
	pub fn parse(location: &'a str) -> Result<Self, FrameParseError> {
		let mut parts = location.rsplitn(3, ':');
		let column = parts.next();
		let line = parts.next();
		let path = parts.next();

		let (path, line, column) = match (path, line, column) {
			(Some(path), Some(line), Some(column)) => (path, line, column),
			_ => return Err(FrameParseError::MissingCoordinates(location.to_string())),
		};

		let line = line
			.trim()
			.parse::<u32>()
			.map_err(|_| FrameParseError::InvalidLine(line.to_string()))?;
		let column = column
			.trim()
			.parse::<u32>()
			.map_err(|_| FrameParseError::InvalidColumn(column.to_string()))?;

		let file_name = path.rsplit('/').next().unwrap_or(path);

		Ok(Self {
			path,
			file_name,
			line,
			column,
		})
	}
}

/// Give a frame without a location an empty-shaped one: `at foo` -> `at (foo)`.
///
/// Lines that are not frames, or already end in `)`, are returned unchanged.
pub fn normalize_bare_frame(line: &str) -> Cow<'_, str> {
	if !is_frame_line(line) || line.trim_end().ends_with(')') {
		return Cow::Borrowed(line);
	}

	let body = line.trim_start();
	let indent = &line[..line.len() - body.len()];
	let rest = body[FRAME_MARKER.len()..].trim_end();

	Cow::Owned(format!("{indent}{FRAME_MARKER}({rest})"))
}

/// Span between the first `(` and the first `)` after it.
fn first_parenthesized(line: &str) -> Option<(usize, usize)> {
	let open = line.find('(')?;
	let close = open + 1 + line[open + 1..].find(')')?;
	Some((open + 1, close))
}

/// Text between the first `(` and the next `)`.
pub fn remote_location(line: &str) -> Option<&str> {
	first_parenthesized(line).map(|(start, end)| &line[start..end])
}

/// Replace the text inside the first pair of parentheses.
///
/// Returns `None` when the line has no parenthesized segment.
pub fn replace_location(line: &str, replacement: &str) -> Option<String> {
	let (start, end) = first_parenthesized(line)?;
	let mut out = String::with_capacity(line.len() + replacement.len());
	out.push_str(&line[..start]);
	out.push_str(replacement);
	out.push_str(&line[end..]);
	Some(out)
}
