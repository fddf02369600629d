//! # tickbench-report
//!
//! The results side of the harness: judging a finished run against its
//! expected digest and iteration count, writing the canonical fixed-format
//! text report to the target console, and capturing the same facts as a
//! JSON [`ResultRecord`] for archiving.

#![warn(missing_docs)]

mod record;
mod render;
mod verify;

pub use record::{
    BenchmarkBlock, RecordMeta, ResultRecord, ResultsBlock, TargetBlock, RECORD_SCHEMA_VERSION,
};
pub use verify::{judge, report_results, Verdict};
