// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reload of the source map table when the compiler rewrites its output.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use edgetrace_stacktrace::SharedSourceMaps;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::WatchError;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

const MAP_SUFFIX: &str = ".mjs.map";
const IDLE_POLL: Duration = Duration::from_millis(200);

/// Coalesces bursts of events into a single action.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
	delay: Duration,
	last_event: Option<Instant>,
}

impl Debouncer {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			last_event: None,
		}
	}

	pub fn record(&mut self, now: Instant) {
		self.last_event = Some(now);
	}

	pub fn is_pending(&self) -> bool {
		self.last_event.is_some()
	}

	/// True once the quiet period after the last event has passed. Clears
	/// the pending state when it fires.
	pub fn fire(&mut self, now: Instant) -> bool {
		match self.last_event {
			Some(last) if now.saturating_duration_since(last) >= self.delay => {
				self.last_event = None;
				true
			}
			_ => false,
		}
	}

	/// How long to wait for the next event before checking again.
	pub fn wait(&self, now: Instant) -> Duration {
		match self.last_event {
			Some(last) => self
				.delay
				.saturating_sub(now.saturating_duration_since(last))
				.max(Duration::from_millis(1)),
			None => IDLE_POLL,
		}
	}
}

/// Background watcher that reloads [`SharedSourceMaps`] after map changes.
///
/// The watcher stops when [`ReloadWatcher::stop`] is called or the value is
/// dropped.
pub struct ReloadWatcher {
	stop: Sender<()>,
	thread: Option<thread::JoinHandle<()>>,
	root: PathBuf,
}

impl ReloadWatcher {
	/// Watch the root of `maps` recursively.
	///
	/// The root's parent is watched as well, so deleting and recreating the
	/// compiled directory (a clean build) keeps reloads going. When the root
	/// does not exist yet, the nearest existing ancestor is watched instead.
	/// Events are filtered to `.mjs.map` files under the root.
	pub fn start(maps: SharedSourceMaps, debounce: Duration) -> Result<Self, WatchError> {
		let plan = watch_plan(maps.root())?;
		let root = plan.root.clone();

		let (event_tx, event_rx) = mpsc::channel();
		let mut watcher = notify::recommended_watcher(move |res| {
			let _ = event_tx.send(res);
		})?;
		watcher.watch(&plan.anchor, plan.anchor_mode)?;
		if root.is_dir() {
			watcher.watch(&root, RecursiveMode::Recursive)?;
		}

		debug!(
			anchor = %plan.anchor.display(),
			root = %root.display(),
			debounce_ms = debounce.as_millis() as u64,
			"watching for source map changes"
		);

		let (stop_tx, stop_rx) = mpsc::channel();
		let loop_root = root.clone();
		let thread = thread::Builder::new()
			.name("edgetrace-watch".to_string())
			.spawn(move || run_loop(watcher, maps, &loop_root, debounce, event_rx, stop_rx))
			.map_err(WatchError::Spawn)?;

		Ok(Self {
			stop: stop_tx,
			thread: Some(thread),
			root,
		})
	}

	/// Directory whose maps trigger reloads.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Stop watching and wait for the watch thread to exit.
	pub fn stop(mut self) {
		let _ = self.stop.send(());
		if let Some(handle) = self.thread.take() {
			let _ = handle.join();
		}
	}
}

impl Drop for ReloadWatcher {
	fn drop(&mut self) {
		let _ = self.stop.send(());
	}
}

impl std::fmt::Debug for ReloadWatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ReloadWatcher")
			.field("root", &self.root)
			.finish_non_exhaustive()
	}
}

fn run_loop(
	mut watcher: RecommendedWatcher,
	maps: SharedSourceMaps,
	root: &Path,
	debounce: Duration,
	events: Receiver<notify::Result<Event>>,
	stop: Receiver<()>,
) {
	let mut debouncer = Debouncer::new(debounce);

	loop {
		if stop_requested(&stop) {
			return;
		}

		match events.recv_timeout(debouncer.wait(Instant::now())) {
			Ok(Ok(event)) => {
				if event.need_rescan() || is_map_event(&event, root) {
					debouncer.record(Instant::now());
				}
				if recreates_root(&event, root) && root.is_dir() {
					// A recreated directory is a new inode; the old watch is gone.
					if let Err(e) = watcher.watch(root, RecursiveMode::Recursive) {
						warn!(root = %root.display(), error = %e, "failed to watch recreated root");
					}
				}
			}
			Ok(Err(e)) => warn!(error = %e, "source map watch error"),
			Err(RecvTimeoutError::Timeout) => {}
			Err(RecvTimeoutError::Disconnected) => {
				warn!("source map watcher disconnected");
				return;
			}
		}

		if debouncer.fire(Instant::now()) {
			maps.reload();
		}
	}
}

fn stop_requested(stop: &Receiver<()>) -> bool {
	match stop.try_recv() {
		Ok(()) => true,
		Err(TryRecvError::Disconnected) => true,
		Err(TryRecvError::Empty) => false,
	}
}

/// Whether `event` changes a source map under `root`, or creates or removes
/// `root` or one of its ancestors.
pub fn is_map_event(event: &Event, root: &Path) -> bool {
	if matches!(event.kind, EventKind::Access(_)) {
		return false;
	}

	let touches_root_kind = matches!(event.kind, EventKind::Create(_) | EventKind::Remove(_));

	event.paths.iter().any(|path| {
		let is_map = path.starts_with(root)
			&& path
				.file_name()
				.is_some_and(|name| name.to_string_lossy().ends_with(MAP_SUFFIX));
		is_map || (touches_root_kind && root.starts_with(path))
	})
}

fn recreates_root(event: &Event, root: &Path) -> bool {
	matches!(event.kind, EventKind::Create(_)) && event.paths.iter().any(|path| root.starts_with(path))
}

/// Where the OS watcher is anchored for a given root.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WatchPlan {
	/// Existing directory above the root.
	anchor: PathBuf,
	/// Non-recursive when the anchor is the root's direct parent; recursive
	/// when intermediate directories still have to be created.
	anchor_mode: RecursiveMode,
	/// `root` with the same canonical prefix the watcher reports events with.
	root: PathBuf,
}

fn watch_plan(root: &Path) -> Result<WatchPlan, WatchError> {
	let absolute =
		std::path::absolute(root).map_err(|source| WatchError::io(root, source))?;

	let Some(name) = absolute.file_name() else {
		// Filesystem root: nothing above it to anchor on.
		let anchor =
			std::fs::canonicalize(&absolute).map_err(|source| WatchError::io(&absolute, source))?;
		return Ok(WatchPlan {
			root: anchor.clone(),
			anchor,
			anchor_mode: RecursiveMode::Recursive,
		});
	};

	let mut missing = vec![name.to_os_string()];
	let mut existing = absolute
		.parent()
		.ok_or_else(|| WatchError::NoWatchableAncestor(absolute.clone()))?;
	while !existing.is_dir() {
		let Some(name) = existing.file_name() else {
			return Err(WatchError::NoWatchableAncestor(absolute.clone()));
		};
		missing.push(name.to_os_string());
		existing = existing
			.parent()
			.ok_or_else(|| WatchError::NoWatchableAncestor(absolute.clone()))?;
	}

	let anchor =
		std::fs::canonicalize(existing).map_err(|source| WatchError::io(existing, source))?;
	let mut canonical_root = anchor.clone();
	for name in missing.iter().rev() {
		canonical_root.push(name);
	}

	let anchor_mode = if missing.len() == 1 {
		RecursiveMode::NonRecursive
	} else {
		RecursiveMode::Recursive
	};

	Ok(WatchPlan {
		anchor,
		anchor_mode,
		root: canonical_root,
	})
}
