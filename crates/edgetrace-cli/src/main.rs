// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! edgetrace - readable stack traces for Kotlin/JS Supabase edge functions
//!
//! Pipe `supabase functions serve` output through `edgetrace filter` and
//! stack frames that point into the edge runtime container are rewritten to
//! the Kotlin sources (or the local JavaScript) they came from.

mod filter;
mod maps;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edgetrace_config::{
	load_config_with_cli,
	runtime::{LogFormat, LogLevel, LoggingConfig},
	CliOverrides, EdgetraceConfig,
};
use edgetrace_stacktrace::{SharedSourceMaps, TraceRewriter};

/// Rewrite edge function stack traces to Kotlin sources
#[derive(Parser, Debug)]
#[command(name = "edgetrace", version, about, long_about = None)]
struct Args {
	/// Path to an additional configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Resolution strategy: none, js-only, kotlin-only, kotlin-preferred
	#[arg(short, long, global = true)]
	strategy: Option<String>,

	/// Directory containing the compiled `.mjs` files and their source maps
	#[arg(long, global = true)]
	compiled_dir: Option<PathBuf>,

	/// Local Supabase directory (replaces the runtime's /home/deno)
	#[arg(long, global = true)]
	supabase_dir: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long, global = true)]
	log_level: Option<String>,

	/// Log format: pretty, compact, json (overrides config)
	#[arg(long, global = true)]
	log_format: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Read runtime output from stdin and write it with rewritten stack frames
	Filter {
		/// Reload source maps when the compiled output changes
		#[arg(long, overrides_with = "no_watch")]
		watch: bool,

		/// Never reload source maps
		#[arg(long)]
		no_watch: bool,
	},
	/// Rewrite the given lines and print them
	Resolve {
		/// Lines to rewrite, e.g. "at main (file:///home/deno/app/index.mjs:3:9)"
		#[arg(required = true)]
		lines: Vec<String>,
	},
	/// List indexed source maps
	Maps {
		/// Output as JSON
		#[arg(long)]
		json: bool,
	},
	/// Print the effective configuration
	Config,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		let watch = match &args.command {
			Command::Filter { watch: true, .. } => Some(true),
			Command::Filter { no_watch: true, .. } => Some(false),
			_ => None,
		};

		CliOverrides {
			strategy: args.strategy.clone(),
			compiled_dir: args.compiled_dir.clone(),
			supabase_dir: args.supabase_dir.clone(),
			watch,
			log_level: args.log_level.clone(),
			log_format: args.log_format.clone(),
			config_file: args.config.clone(),
		}
	}
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

/// Diagnostics go to stderr; stdout carries the filtered stream.
fn init_tracing(logging: &LoggingConfig) {
	let level = log_level_to_tracing(logging.level);
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("edgetrace={level},edge_function={level}")));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

fn build_rewriter(config: &EdgetraceConfig) -> TraceRewriter {
	let stacktrace = &config.stacktrace;
	let maps = SharedSourceMaps::load(&stacktrace.compiled_dir, stacktrace.strategy);
	TraceRewriter::new(maps, &stacktrace.supabase_dir)
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let cli_overrides = CliOverrides::from(&args);
	let config = load_config_with_cli(cli_overrides).context("failed to load configuration")?;

	init_tracing(&config.logging);

	debug!(
		strategy = %config.stacktrace.strategy,
		supabase_dir = %config.stacktrace.supabase_dir.display(),
		"starting edgetrace"
	);

	match &args.command {
		Command::Filter { .. } => {
			let rewriter = build_rewriter(&config);
			let watch = config.watch_enabled().then(|| config.watch.debounce());
			filter::run(rewriter, watch).await
		}
		Command::Resolve { lines } => {
			let rewriter = build_rewriter(&config);
			for line in lines {
				println!("{}", rewriter.rewrite(line));
			}
			Ok(())
		}
		Command::Maps { json } => maps::run(&config.stacktrace.compiled_dir, *json),
		Command::Config => {
			let text = toml::to_string_pretty(&config).context("failed to render configuration")?;
			print!("{text}");
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn test_cli_definition_is_valid() {
		Args::command().debug_assert();
	}

	#[test]
	fn test_global_flags_become_overrides() {
		let args = Args::try_parse_from([
			"edgetrace",
			"resolve",
			"--strategy",
			"kotlin-only",
			"--compiled-dir",
			"/out",
			"--log-format",
			"json",
			"at x (a.mjs:1:1)",
		])
		.unwrap();

		let overrides = CliOverrides::from(&args);
		assert_eq!(overrides.strategy.as_deref(), Some("kotlin-only"));
		assert_eq!(overrides.compiled_dir, Some(PathBuf::from("/out")));
		assert_eq!(overrides.log_format.as_deref(), Some("json"));
		assert_eq!(overrides.watch, None);
	}

	#[test]
	fn test_watch_flags() {
		let watch = |argv: &[&str]| {
			let args = Args::try_parse_from(argv).unwrap();
			CliOverrides::from(&args).watch
		};

		assert_eq!(watch(&["edgetrace", "filter"]), None);
		assert_eq!(watch(&["edgetrace", "filter", "--watch"]), Some(true));
		assert_eq!(watch(&["edgetrace", "filter", "--no-watch"]), Some(false));
	}

	#[test]
	fn test_resolve_requires_lines() {
		assert!(Args::try_parse_from(["edgetrace", "resolve"]).is_err());
	}

	#[test]
	fn test_log_level_mapping() {
		assert_eq!(log_level_to_tracing(LogLevel::Warn), tracing::Level::WARN);
		assert_eq!(log_level_to_tracing(LogLevel::Trace), tracing::Level::TRACE);
	}
}
