// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Processing of edge runtime output into rewritten, levelled lines.

use std::io::{self, Write};

use edgetrace_stacktrace::{is_frame_line, TraceRewriter};

use crate::level::{LevelTagger, ServeLevel};
use crate::line::LineAssembler;

/// Destination for processed lines.
pub trait LineSink {
	fn emit(&mut self, level: ServeLevel, line: &str) -> io::Result<()>;

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
	fn emit(&mut self, level: ServeLevel, line: &str) -> io::Result<()> {
		(**self).emit(level, line)
	}

	fn flush(&mut self) -> io::Result<()> {
		(**self).flush()
	}
}

/// Writes `Info` lines to one writer and `Error` lines to another.
#[derive(Debug)]
pub struct WriterSink<O, E> {
	out: O,
	err: E,
}

impl<O: Write, E: Write> WriterSink<O, E> {
	pub fn new(out: O, err: E) -> Self {
		Self { out, err }
	}

	pub fn into_inner(self) -> (O, E) {
		(self.out, self.err)
	}
}

impl WriterSink<io::Stdout, io::Stderr> {
	pub fn stdio() -> Self {
		Self::new(io::stdout(), io::stderr())
	}
}

impl<O: Write, E: Write> LineSink for WriterSink<O, E> {
	fn emit(&mut self, level: ServeLevel, line: &str) -> io::Result<()> {
		match level {
			ServeLevel::Info => writeln!(self.out, "{line}"),
			ServeLevel::Error => writeln!(self.err, "{line}"),
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		self.out.flush()?;
		self.err.flush()
	}
}

/// Emits each line as a tracing event under the `edge_function` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LineSink for TracingSink {
	fn emit(&mut self, level: ServeLevel, line: &str) -> io::Result<()> {
		match level {
			ServeLevel::Info => tracing::info!(target: "edge_function", "{line}"),
			ServeLevel::Error => tracing::error!(target: "edge_function", "{line}"),
		}
		Ok(())
	}
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
	pub lines: Vec<(ServeLevel, String)>,
}

impl LineSink for MemorySink {
	fn emit(&mut self, level: ServeLevel, line: &str) -> io::Result<()> {
		self.lines.push((level, line.to_string()));
		Ok(())
	}
}

/// Runtime output stream: raw bytes in, rewritten lines out.
///
/// Implements [`Write`] so a child process's output can be copied straight
/// into it.
pub struct ServeOutput<S> {
	rewriter: TraceRewriter,
	tagger: LevelTagger,
	assembler: LineAssembler,
	sink: S,
	last_message: Option<String>,
}

impl<S: LineSink> ServeOutput<S> {
	pub fn new(rewriter: TraceRewriter, sink: S) -> Self {
		Self {
			rewriter,
			tagger: LevelTagger::new(),
			assembler: LineAssembler::new(),
			sink,
			last_message: None,
		}
	}

	/// Process one complete line.
	pub fn process_line(&mut self, raw: &str) -> io::Result<()> {
		let (level, text) = self.tagger.tag(raw);

		if is_frame_line(text) {
			let rewritten = self.rewriter.rewrite(text);
			self.sink.emit(level, &rewritten)?;
		} else {
			self.sink.emit(level, text)?;
		}

		self.last_message = Some(raw.to_string());
		Ok(())
	}

	/// Process a chunk of raw output, buffering any trailing partial line.
	pub fn process_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
		for line in self.assembler.push(bytes) {
			self.process_line(&line)?;
		}
		Ok(())
	}

	/// Process the buffered partial line, if any, and flush the sink.
	pub fn finish(&mut self) -> io::Result<()> {
		if let Some(line) = self.assembler.finish() {
			self.process_line(&line)?;
		}
		self.sink.flush()
	}

	/// The last raw line processed, before level stripping and rewriting.
	pub fn last_message(&self) -> Option<&str> {
		self.last_message.as_deref()
	}

	pub fn level(&self) -> ServeLevel {
		self.tagger.current()
	}

	pub fn rewriter(&self) -> &TraceRewriter {
		&self.rewriter
	}

	pub fn sink(&self) -> &S {
		&self.sink
	}

	pub fn into_sink(self) -> S {
		self.sink
	}
}

impl<S: LineSink> Write for ServeOutput<S> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.process_bytes(buf)?;
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		self.sink.flush()
	}
}

impl<S> std::fmt::Debug for ServeOutput<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServeOutput")
			.field("rewriter", &self.rewriter)
			.field("level", &self.tagger.current())
			.field("last_message", &self.last_message)
			.finish_non_exhaustive()
	}
}
