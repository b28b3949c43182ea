// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `edgetrace filter`: stdin to stdout/stderr with rewritten frames.

use std::io::{ErrorKind, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use edgetrace_serve::{ReloadWatcher, ServeOutput, WriterSink};
use edgetrace_stacktrace::TraceRewriter;

const READ_BUF_SIZE: usize = 8 * 1024;

pub async fn run(rewriter: TraceRewriter, watch: Option<Duration>) -> Result<()> {
	let watcher = match watch {
		Some(debounce) => match ReloadWatcher::start(rewriter.maps().clone(), debounce) {
			Ok(watcher) => {
				info!(root = %watcher.root().display(), "watching for source map changes");
				Some(watcher)
			}
			Err(e) => {
				warn!(error = %e, "source map watching disabled");
				None
			}
		},
		None => None,
	};

	let mut output = ServeOutput::new(rewriter, WriterSink::stdio());
	let result = pump(&mut output).await;
	let finished = output.finish();

	if let Some(watcher) = watcher {
		watcher.stop();
	}

	match result.and(finished.map_err(Into::into)) {
		Err(e) if is_broken_pipe(&e) => {
			debug!("output closed");
			Ok(())
		}
		other => other,
	}
}

async fn pump(output: &mut ServeOutput<WriterSink<std::io::Stdout, std::io::Stderr>>) -> Result<()> {
	let mut stdin = tokio::io::stdin();
	let mut buf = vec![0u8; READ_BUF_SIZE];

	loop {
		let n = tokio::select! {
			read = stdin.read(&mut buf) => read.context("failed to read stdin")?,
			_ = tokio::signal::ctrl_c() => {
				debug!("interrupted");
				return Ok(());
			}
		};
		if n == 0 {
			return Ok(());
		}

		output.process_bytes(&buf[..n])?;
		output.flush()?;
	}
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
	err.chain().any(|cause| {
		cause
			.downcast_ref::<std::io::Error>()
			.is_some_and(|e| e.kind() == ErrorKind::BrokenPipe)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_broken_pipe_detection() {
		let err = anyhow::Error::from(std::io::Error::from(ErrorKind::BrokenPipe));
		assert!(is_broken_pipe(&err));

		let err = anyhow::Error::from(std::io::Error::from(ErrorKind::BrokenPipe))
			.context("failed to write output");
		assert!(is_broken_pipe(&err));

		let err = anyhow::anyhow!("something else");
		assert!(!is_broken_pipe(&err));
	}
}
