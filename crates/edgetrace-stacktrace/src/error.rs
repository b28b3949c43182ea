// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for stack trace handling.

use thiserror::Error;

/// Reasons a line could not be tokenized as a stack frame.
///
/// These never escape [`crate::TraceRewriter::rewrite`]; they select which
/// fallback the rewriter takes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameParseError {
	#[error("line is not a stack frame")]
	NotAFrame,

	#[error("frame has no parenthesized location")]
	MissingLocation,

	#[error("location has no line and column: {0}")]
	MissingCoordinates(String),

	#[error("invalid line number: {0}")]
	InvalidLine(String),

	#[error("invalid column number: {0}")]
	InvalidColumn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackTraceError {
	#[error("unknown resolution strategy: {0} (expected none, js-only, kotlin-only or kotlin-preferred)")]
	InvalidStrategy(String),
}
