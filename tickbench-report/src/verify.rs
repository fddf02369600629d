//! Results Verification Protocol
//!
//! `report_results` is the single exit point of a benchmark invocation: it
//! judges the filled descriptor against the expected digest and the
//! required iteration count, writes the canonical text report to the target
//! console, and returns the status. It never terminates the process; the
//! runner decides what a failure means.

use tickbench_core::{Harness, Status, TestCase, VerifyConfig};

use crate::render::{render_body, render_footer};

/// Outcome of the two verification checks, judged independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// The digest check was enabled and the accumulated digest did not
    /// match the expected value
    pub digest_failed: bool,
    /// The achieved iteration count did not match the required count
    pub iterations_failed: bool,
}

impl Verdict {
    /// Collapse the checks into a run status. Either failure is fatal to
    /// the run; neither masks the other in the report.
    pub fn status(&self) -> Status {
        if self.digest_failed || self.iterations_failed {
            Status::Failure
        } else {
            Status::Success
        }
    }
}

/// Judge a filled descriptor without rendering anything.
///
/// The digest check only participates when digest verification is enabled;
/// the iteration check always runs.
pub fn judge(config: VerifyConfig, tc: &TestCase, expected_digest: u16) -> Verdict {
    Verdict {
        digest_failed: config.digest.is_enabled() && tc.digest != expected_digest,
        iterations_failed: tc.iterations != tc.rec_iterations,
    }
}

/// Verify a finished run and write the canonical report to the target
/// console.
///
/// The fixed report block is written first, then the platform's
/// [`report_hook`](tickbench_core::Platform::report_hook) runs so targets
/// can append their own lines without disturbing the block automated
/// readers parse, then the `>> BM:` / `>> ID:` footer closes the report.
/// Reading an unmodified descriptor twice produces byte-identical output.
pub fn report_results(harness: &Harness, tc: &TestCase, expected_digest: u16) -> Status {
    let verdict = judge(harness.verify(), tc, expected_digest);
    tracing::debug!(
        bm_id = %tc.bm_id,
        digest_failed = verdict.digest_failed,
        iterations_failed = verdict.iterations_failed,
        "judged run"
    );

    harness.send_str(&render_body(harness, tc, expected_digest, &verdict));
    harness.platform().report_hook();
    harness.send_str(&render_footer(tc));

    verdict.status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbench_core::DigestMode;

    fn filled(iterations: u64, digest: u16) -> TestCase {
        let mut tc = TestCase::new("bm-x", "a benchmark", 100);
        tc.iterations = iterations;
        tc.digest = digest;
        tc.duration = 500;
        tc
    }

    #[test]
    fn checks_are_judged_independently() {
        let config = VerifyConfig::default();

        let both_pass = judge(config, &filled(100, 0xBEEF), 0xBEEF);
        assert!(!both_pass.digest_failed);
        assert!(!both_pass.iterations_failed);
        assert_eq!(both_pass.status(), Status::Success);

        let digest_only = judge(config, &filled(100, 0xDEAD), 0xBEEF);
        assert!(digest_only.digest_failed);
        assert!(!digest_only.iterations_failed);
        assert_eq!(digest_only.status(), Status::Failure);

        let iterations_only = judge(config, &filled(99, 0xBEEF), 0xBEEF);
        assert!(!iterations_only.digest_failed);
        assert!(iterations_only.iterations_failed);
        assert_eq!(iterations_only.status(), Status::Failure);

        let both_fail = judge(config, &filled(99, 0xDEAD), 0xBEEF);
        assert!(both_fail.digest_failed);
        assert!(both_fail.iterations_failed);
        assert_eq!(both_fail.status(), Status::Failure);
    }

    #[test]
    fn disabled_digest_never_fails() {
        let config = VerifyConfig {
            digest: DigestMode::Off,
            ..VerifyConfig::default()
        };
        let verdict = judge(config, &filled(100, 0xDEAD), 0xBEEF);
        assert!(!verdict.digest_failed);
        assert_eq!(verdict.status(), Status::Success);
    }
}
