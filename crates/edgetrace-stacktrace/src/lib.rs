// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack trace rewriting for Kotlin/JS edge functions.
//!
//! Deno reports frames against the generated JavaScript inside the edge
//! runtime container. [`TraceRewriter`] maps each frame back to the Kotlin
//! source through the compiler's source maps, or to the local copy of the
//! generated file, depending on the [`ResolutionStrategy`].
//!
//! # Example
//!
//! ```
//! use edgetrace_stacktrace::{ResolutionStrategy, SharedSourceMaps, TraceRewriter};
//!
//! let maps = SharedSourceMaps::load("build/compileSync", ResolutionStrategy::None);
//! let rewriter = TraceRewriter::new(maps, "supabase");
//!
//! assert_eq!(rewriter.rewrite("Listening on :8000"), "Listening on :8000");
//! assert_eq!(
//!     rewriter.rewrite("    at handler (file:///home/deno/functions/app/index.mjs:3:9)"),
//!     "    at handler (Unknown Source)"
//! );
//! ```

pub mod error;
pub mod frame;
pub mod remote;
pub mod rewriter;
pub mod shared;
pub mod strategy;

pub use error::{FrameParseError, StackTraceError};
pub use frame::{is_frame_line, Frame, FrameLocation};
pub use rewriter::{TraceRewriter, UNKNOWN_SOURCE};
pub use shared::SharedSourceMaps;
pub use strategy::{Fallback, ResolutionStrategy};
