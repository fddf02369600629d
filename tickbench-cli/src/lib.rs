//! # tickbench-cli
//!
//! Runner glue for harness binaries: a clap argument parser, tickbench.toml
//! discovery, and `run`/`run_with_cli` entry points that resolve
//! configuration, bind the platform into a harness, invoke the benchmark,
//! and hand back the judged status for the process exit code.

#![warn(missing_docs)]

pub mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use tickbench_core::{
    install_redirect, uninstall_redirect, BenchFn, Harness, Platform, Status, TargetIdent,
    TestCase,
};

use config::TickConfig;

// Workspace crates share the tickbench name prefix but are separate tracing
// targets; each needs its own directive.
const VERBOSE_FILTER: &str =
    "tickbench=debug,tickbench_core=debug,tickbench_report=debug,tickbench_host=debug,tickbench_cli=debug";
const DEFAULT_FILTER: &str =
    "tickbench=info,tickbench_core=info,tickbench_report=info,tickbench_host=info,tickbench_cli=info";

/// Command-line arguments for a harness runner binary
#[derive(Parser, Debug)]
#[command(name = "tickbench", version, about = "Portable microbenchmark test harness")]
pub struct Cli {
    /// Path to a tickbench.toml configuration file (discovered by walking
    /// up from the current directory when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the programmed iteration count
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run a benchmark under the harness with arguments from the process
/// command line. This is the main entry point for benchmark binaries.
///
/// # Returns
/// The judged [`Status`]; map it to the process exit code with
/// [`Status::code`]. Errors only for unusable configuration, never for a
/// failed verification.
pub fn run(platform: Arc<dyn Platform>, tc: TestCase, bench: BenchFn) -> anyhow::Result<Status> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(VERBOSE_FILTER)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(DEFAULT_FILTER)
            .init();
    }

    run_with_cli(cli, platform, tc, bench)
}

/// Run a benchmark under the harness with pre-parsed arguments. Does not
/// touch the global logging subscriber, so callers can drive it repeatedly
/// in one process.
pub fn run_with_cli(
    cli: Cli,
    platform: Arc<dyn Platform>,
    mut tc: TestCase,
    bench: BenchFn,
) -> anyhow::Result<Status> {
    // Resolve tickbench.toml configuration (CLI flags override)
    let config = match &cli.config {
        Some(path) => TickConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TickConfig::discover().unwrap_or_default(),
    };

    if let Some(iterations) = resolve_iterations(&cli, &config) {
        tc.iterations = iterations;
    }

    let ident = TargetIdent::new(
        &config.target.member,
        &config.target.processor,
        &config.target.platform,
    );

    if config.allocator.redirect {
        install_redirect(platform.clone());
    }

    let harness = Harness::bind(platform, ident, config.verify);
    tracing::info!(bm_id = %tc.bm_id, iterations = tc.iterations, "starting benchmark");
    let status = bench(&harness, &mut tc);
    tracing::info!(bm_id = %tc.bm_id, status = ?status, "benchmark finished");

    if config.allocator.redirect {
        uninstall_redirect();
    }

    Ok(status)
}

/// Iteration count precedence: CLI flag, then config file, then the
/// descriptor's programmed count.
fn resolve_iterations(cli: &Cli, config: &TickConfig) -> Option<u64> {
    cli.iterations.or(config.benchmark.iterations)
}
