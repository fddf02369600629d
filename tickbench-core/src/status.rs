//! Run Outcome Codes

use serde::{Deserialize, Serialize};

/// Outcome of a benchmark invocation, mapped to a process exit code by the
/// runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Every enabled verification check passed
    Success,
    /// A digest or iteration-count check failed
    Failure,
    /// Allocation was requested before the harness owned an allocator
    OutOfMemory,
}

impl Status {
    /// Process exit code for this outcome.
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::Failure => 1,
            Status::OutOfMemory => 8,
        }
    }

    /// True for [`Status::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}
