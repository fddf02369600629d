//! Fixed-Point Autocorrelation Benchmark
//!
//! A small signal-processing kernel under the harness: autocorrelation of a
//! synthetic 16-bit waveform at 16 lags, digest-verified against the known
//! answer for the dataset.
//!
//! Run with:
//!   cargo run --example autocor                       # Run on the host platform
//!   cargo run --example autocor -- --iterations 500   # Override the iteration count
//!   cargo run --example autocor -- --help             # Show all options

use std::hint::black_box;
use std::sync::Arc;

use tickbench::prelude::*;
use tickbench::HostPlatform;

// ============================================================================
// Dataset
// ============================================================================

const INPUT_SIZE: usize = 1024;
const NUM_LAGS: usize = 16;
const SCALE: u32 = 2;
const REC_ITERATIONS: u64 = 100;

/// Digest of the 16 autocorrelation terms for this dataset, accumulated low
/// byte first from an initial value of 0.
const EXPECTED_DIGEST: u16 = 0x9CD4;

/// Synthetic full-scale waveform, periodic with a stride coprime to the
/// sample range.
fn input_waveform() -> Vec<i16> {
    (0..INPUT_SIZE)
        .map(|i| ((i * 13 % 256) as i16) - 128)
        .collect()
}

// ============================================================================
// Kernel
// ============================================================================

/// Fixed-point autocorrelation. Each product is pre-scaled down by `SCALE`
/// bits, accumulated at 32 bits, and the sum narrowed to its high half.
fn autocorrelate(input: &[i16], output: &mut [i16]) {
    for (lag, out) in output.iter_mut().enumerate() {
        let mut acc: i32 = 0;
        for (&a, &b) in input.iter().zip(&input[lag..]) {
            acc += (i32::from(a) * i32::from(b)) >> SCALE;
        }
        *out = (acc >> 16) as i16;
    }
}

// ============================================================================
// Harness Entry Point
// ============================================================================

fn bench_autocor(harness: &Harness, tc: &mut TestCase) -> Status {
    let input = input_waveform();
    let mut output = [0i16; NUM_LAGS];

    harness.signal_start();
    for _ in 0..tc.iterations {
        autocorrelate(black_box(&input), &mut output);
        black_box(&output);
    }
    tc.duration = harness.signal_finished();

    // Non-intrusive digest over the final output, outside the window.
    tc.digest = output.iter().fold(0, |crc, &v| digest::word(crc, v as u16));

    report_results(harness, tc, EXPECTED_DIGEST)
}

fn main() {
    let platform = Arc::new(HostPlatform::new());
    let tc = TestCase::new(
        "tel-autcor",
        "Fixed-point autocorrelation",
        REC_ITERATIONS,
    );

    match tickbench::run(platform, tc, bench_autocor) {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
