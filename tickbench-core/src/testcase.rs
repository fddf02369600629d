//! Benchmark Descriptor

use crate::platform::{clip, DESC_LEN, IDENT_LEN};
use crate::timing::UNDEFINED_DURATION;

/// Per-invocation benchmark descriptor.
///
/// The benchmark fills in results (`iterations`, `digest`, `duration`, the
/// verification values) before handing the descriptor to the verification
/// protocol. One descriptor belongs to exactly one in-flight invocation;
/// reusing it for another run means re-populating every result field.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Benchmark identifier printed in the report footer
    pub bm_id: String,
    /// Human-readable benchmark description
    pub desc: String,
    /// Required (digest-enforced) or recommended iteration count
    pub rec_iterations: u64,
    /// Programmed iteration count, and after the run, the achieved count
    pub iterations: u64,
    /// Correctness digest accumulated by the benchmark
    pub digest: u16,
    /// Measured duration in ticks, or [`UNDEFINED_DURATION`]
    pub duration: u64,
    /// Generic verification value 1
    pub v1: i32,
    /// Generic verification value 2
    pub v2: i32,
    /// Generic verification value 3
    pub v3: i32,
    /// Generic verification value 4
    pub v4: i32,
}

impl TestCase {
    /// Build a descriptor with `iterations` programmed to the recommended
    /// count and all result fields cleared. Identification fields are
    /// clipped to the fixed report widths.
    pub fn new(bm_id: &str, desc: &str, rec_iterations: u64) -> Self {
        Self {
            bm_id: clip(bm_id, IDENT_LEN),
            desc: clip(desc, DESC_LEN),
            rec_iterations,
            iterations: rec_iterations,
            digest: 0,
            duration: UNDEFINED_DURATION,
            v1: 0,
            v2: 0,
            v3: 0,
            v4: 0,
        }
    }

    /// Reinterpret (v1,v2) and (v3,v4) as two IEEE-754 doubles, low 32 bits
    /// first.
    pub fn verify_doubles(&self) -> (f64, f64) {
        (pack(self.v1, self.v2), pack(self.v3, self.v4))
    }

    /// Store two doubles into the verification value slots, low 32 bits
    /// first. Inverse of [`verify_doubles`](TestCase::verify_doubles).
    pub fn set_verify_doubles(&mut self, first: f64, second: f64) {
        (self.v1, self.v2) = unpack(first);
        (self.v3, self.v4) = unpack(second);
    }
}

fn pack(lo: i32, hi: i32) -> f64 {
    f64::from_bits((u64::from(hi as u32) << 32) | u64::from(lo as u32))
}

fn unpack(value: f64) -> (i32, i32) {
    let bits = value.to_bits();
    (bits as u32 as i32, (bits >> 32) as u32 as i32)
}
