// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Processing of `supabase functions serve` output.
//!
//! Raw runtime output is split into lines, tagged with the level announced by
//! the runtime, and stack frames are rewritten before reaching a [`LineSink`].
//! [`ReloadWatcher`] keeps the source map table current while the Kotlin
//! compiler runs in continuous mode.

pub mod error;
pub mod level;
pub mod line;
pub mod output;
pub mod watch;

pub use error::WatchError;
pub use level::{LevelTagger, ServeLevel};
pub use line::LineAssembler;
pub use output::{LineSink, MemorySink, ServeOutput, TracingSink, WriterSink};
pub use watch::{is_map_event, Debouncer, ReloadWatcher, DEFAULT_DEBOUNCE_MS};
