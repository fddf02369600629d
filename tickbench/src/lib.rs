#![warn(missing_docs)]
//! # Tickbench
//!
//! Portable microbenchmark test harness for embedded targets.
//!
//! Tickbench keeps benchmark code identical across targets whose I/O,
//! timers, and allocators differ:
//! - **One seam**: targets implement the [`Platform`] capability trait; benchmark code sees only the bound [`Harness`]
//! - **Explicit measurement windows**: `signal_start` / `signal_finished` around the measured loop, policed by a phase machine
//! - **Verified results**: CRC-16 digest and iteration-count checks decide pass/fail; timing never does
//! - **Canonical reports**: a fixed-format console block automated readers parse, plus a JSON [`ResultRecord`] for archiving
//! - **Allocator capture**: targets that own their heap observe every allocation the benchmark makes
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tickbench::prelude::*;
//! use tickbench::HostPlatform;
//!
//! fn bench(harness: &Harness, tc: &mut TestCase) -> Status {
//!     harness.signal_start();
//!     for _ in 0..tc.iterations {
//!         // measured work
//!     }
//!     tc.duration = harness.signal_finished();
//!     tc.digest = 0x1234; // accumulated over the benchmark output
//!     report_results(harness, tc, 0x1234)
//! }
//!
//! fn main() {
//!     let platform = Arc::new(HostPlatform::new());
//!     let tc = TestCase::new("bm-id", "My benchmark", 100);
//!     match tickbench::run(platform, tc, bench) {
//!         Ok(status) => std::process::exit(status.code()),
//!         Err(e) => {
//!             eprintln!("Error: {}", e);
//!             std::process::exit(1);
//!         }
//!     }
//! }
//! ```

// Re-export core types
pub use tickbench_core::{
    install_redirect, iterations_per_sec, redirect_installed, seconds, uninstall_redirect,
    AllocSite, BenchFn, ContractViolation, DigestMode, Harness, Phase, Platform,
    RedirectAllocator, Status, TargetCaps, TargetIdent, TestCase, TestFile, VerifyConfig, Version,
    DESC_LEN, HARNESS_ID, HARNESS_REVISION, HARNESS_VERSION, IDENT_LEN, UNDEFINED_DURATION,
};

// The digest stays a module so call sites read digest::word(...)
pub use tickbench_core::digest;

// Re-export the verification protocol and the archival record
pub use tickbench_report::{
    judge, report_results, BenchmarkBlock, RecordMeta, ResultRecord, ResultsBlock, TargetBlock,
    Verdict, RECORD_SCHEMA_VERSION,
};

// Re-export reference platforms
pub use tickbench_host::{HostPlatform, SimExit, SimPlatform};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        digest, report_results, BenchFn, DigestMode, Harness, Platform, Status, TargetCaps,
        TargetIdent, TestCase, VerifyConfig, UNDEFINED_DURATION,
    };
}

/// Run a benchmark under the harness CLI.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() {
///     let platform = Arc::new(HostPlatform::new());
///     let tc = TestCase::new("bm-id", "My benchmark", 100);
///     std::process::exit(tickbench::run(platform, tc, bench).unwrap().code());
/// }
/// ```
pub use tickbench_cli::run;
