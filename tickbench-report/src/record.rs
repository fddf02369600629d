//! Machine-Readable Result Record
//!
//! A serde mirror of the facts in the canonical text report, for archiving
//! runs as JSON. The text surface stays authoritative for pass/fail; the
//! record is produced after judging and never feeds back into it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tickbench_core::{
    iterations_per_sec, seconds, DigestMode, Harness, Status, TargetCaps, TestCase, Version,
    HARNESS_ID, UNDEFINED_DURATION,
};

/// Bumped whenever a field is added, removed, or reinterpreted.
pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// Record envelope metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Record layout version
    pub schema_version: u32,
    /// Harness component identifier
    pub harness: String,
    /// Harness version that produced the record
    pub harness_version: Version,
    /// Wall-clock time the record was created
    pub timestamp: DateTime<Utc>,
}

/// The target the run executed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetBlock {
    /// Member company running the benchmark
    pub member: String,
    /// Target processor name
    pub processor: String,
    /// Target board or platform name
    pub platform: String,
    /// Normalized capability flags
    pub caps: TargetCaps,
    /// Version of the target hardware or abstraction layer
    pub target_version: Version,
    /// Timer rate in ticks per second
    pub ticks_per_sec: u64,
    /// Minimum observable timer increment in ticks
    pub tick_granularity: u64,
}

/// The benchmark that ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkBlock {
    /// Benchmark identifier
    pub bm_id: String,
    /// Human-readable description
    pub desc: String,
    /// Required or recommended iteration count
    pub rec_iterations: u64,
    /// Achieved iteration count
    pub iterations: u64,
}

/// Measured and verified results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsBlock {
    /// Digest checking mode in effect
    pub digest_mode: DigestMode,
    /// Digest the benchmark accumulated
    pub digest: u16,
    /// Digest the run was expected to produce
    pub expected_digest: u16,
    /// Measured duration in ticks; absent when no timer backed the window
    pub duration_ticks: Option<u64>,
    /// Duration in seconds, where derivable
    pub total_seconds: Option<f64>,
    /// Iteration throughput, where derivable
    pub iterations_per_sec: Option<f64>,
    /// The four generic verification values
    pub v: [i32; 4],
}

/// One archived benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Envelope metadata
    pub meta: RecordMeta,
    /// Target identification and capabilities
    pub target: TargetBlock,
    /// Benchmark identification
    pub benchmark: BenchmarkBlock,
    /// Measured results
    pub results: ResultsBlock,
    /// Judged outcome
    pub status: Status,
}

impl ResultRecord {
    /// Capture a finished run. `status` comes from the verification
    /// protocol, typically the return value of
    /// [`report_results`](crate::report_results).
    pub fn new(harness: &Harness, tc: &TestCase, expected_digest: u16, status: Status) -> Self {
        let ident = harness.ident();
        let rate = harness.ticks_per_sec();
        let duration_ticks = if tc.duration == UNDEFINED_DURATION {
            None
        } else {
            Some(tc.duration)
        };

        Self {
            meta: RecordMeta {
                schema_version: RECORD_SCHEMA_VERSION,
                harness: HARNESS_ID.to_string(),
                harness_version: harness.harness_version(),
                timestamp: Utc::now(),
            },
            target: TargetBlock {
                member: ident.member.clone(),
                processor: ident.processor.clone(),
                platform: ident.platform.clone(),
                caps: harness.caps(),
                target_version: harness.target_version(),
                ticks_per_sec: rate,
                tick_granularity: harness.tick_granularity(),
            },
            benchmark: BenchmarkBlock {
                bm_id: tc.bm_id.clone(),
                desc: tc.desc.clone(),
                rec_iterations: tc.rec_iterations,
                iterations: tc.iterations,
            },
            results: ResultsBlock {
                digest_mode: harness.verify().digest,
                digest: tc.digest,
                expected_digest,
                duration_ticks,
                total_seconds: seconds(tc.duration, rate),
                iterations_per_sec: iterations_per_sec(tc.iterations, tc.duration, rate),
                v: [tc.v1, tc.v2, tc.v3, tc.v4],
            },
            status,
        }
    }

    /// Serialize the record as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
