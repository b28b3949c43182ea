// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reassembly of complete lines from arbitrarily chunked output.

/// Buffers raw bytes until a full line is available.
///
/// Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8 is
/// replaced lossily. Empty lines are yielded like any other.
#[derive(Debug, Default)]
pub struct LineAssembler {
	buf: Vec<u8>,
}

impl LineAssembler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append `bytes` and return every line they complete.
	pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
		let mut lines = Vec::new();

		for &byte in bytes {
			if byte == b'\n' {
				lines.push(self.take_line());
			} else {
				self.buf.push(byte);
			}
		}

		lines
	}

	/// Flush a trailing line that never saw its newline.
	pub fn finish(&mut self) -> Option<String> {
		if self.buf.is_empty() {
			None
		} else {
			Some(self.take_line())
		}
	}

	/// Bytes buffered for the current partial line.
	pub fn pending(&self) -> usize {
		self.buf.len()
	}

	fn take_line(&mut self) -> String {
		if self.buf.last() == Some(&b'\r') {
			self.buf.pop();
		}
		let line = String::from_utf8_lossy(&self.buf).into_owned();
		self.buf.clear();
		line
	}
}
