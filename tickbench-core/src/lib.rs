//! # tickbench-core
//!
//! Core types for the tickbench harness: the platform capability trait,
//! the bound harness handle, benchmark descriptors, verification
//! configuration, and the tick arithmetic shared by every report surface.
//!
//! ## Design
//!
//! - **One seam**: everything target-specific lives behind the
//!   [`Platform`] trait. Benchmark code sees only the bound [`Harness`].
//! - **Explicit phases**: measurement windows move through
//!   idle/running/finished under an atomic, and misordered transitions
//!   terminate instead of skewing results.
//! - **No hidden heap**: targets that own their memory install
//!   [`RedirectAllocator`] and observe every allocation the benchmark
//!   makes.

#![warn(missing_docs)]

mod alloc;
mod config;
pub mod digest;
mod harness;
mod platform;
mod status;
mod testcase;
mod timing;

pub use alloc::{install_redirect, redirect_installed, uninstall_redirect, RedirectAllocator};
pub use config::{DigestMode, VerifyConfig};
pub use harness::{BenchFn, ContractViolation, Harness, Phase};
pub use platform::{
    AllocSite, Platform, TargetCaps, TargetIdent, TestFile, Version, DESC_LEN, HARNESS_ID,
    HARNESS_REVISION, HARNESS_VERSION, IDENT_LEN,
};
pub use status::Status;
pub use testcase::TestCase;
pub use timing::{iterations_per_sec, seconds, UNDEFINED_DURATION};
