//! # tickbench-host
//!
//! Reference [`Platform`](tickbench_core::Platform) implementations for
//! running benchmarks off-target:
//!
//! - [`HostPlatform`]: the invoking process itself, with stdout as the
//!   console and the monotonic clock as the timer.
//! - [`SimPlatform`]: a fully scripted in-memory target for tests, with a
//!   manually advanced clock and a captured console.

#![warn(missing_docs)]

mod host;
mod sim;

pub use host::HostPlatform;
pub use sim::{SimExit, SimPlatform};
