//! Canonical Text Report
//!
//! The fixed-format log block automated readers parse. Layout is a
//! compatibility surface: identification lines are `>> ` with the label
//! padded to 25 columns before `: `, result lines are `--  ` with the
//! label padded to 18 columns before `= `. Changing a column here breaks
//! every downstream log scraper, so the tests pin exact byte sequences.

use tickbench_core::{
    iterations_per_sec, seconds, DigestMode, Harness, TestCase, HARNESS_ID, UNDEFINED_DURATION,
};

use crate::verify::Verdict;

const RULE: &str = ">>------------------------------------------------------------\n";

fn push_ident(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(">> {:<25}: {}\n", label, value));
}

fn push_result(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("--  {:<18}= {}\n", label, value));
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

/// Render the fixed report block: identification, results, verification
/// failures, and the DONE/Failure line. The platform hook and the footer
/// are appended separately by the caller.
pub(crate) fn render_body(
    harness: &Harness,
    tc: &TestCase,
    expected_digest: u16,
    verdict: &Verdict,
) -> String {
    let verify = harness.verify();
    let caps = harness.caps();
    let ident = harness.ident();
    let mut out = String::new();

    out.push_str(RULE);
    push_ident(
        &mut out,
        "Harness Component",
        &format!("{} v{}", HARNESS_ID, harness.harness_version()),
    );
    push_ident(&mut out, "Member Company", &ident.member);
    push_ident(&mut out, "Target Processor", &ident.processor);
    push_ident(&mut out, "Target Platform", &ident.platform);
    push_ident(&mut out, "Target Timer Available", yes_no(caps.timer_available));
    push_ident(&mut out, "Target Timer Intrusive", yes_no(caps.timer_intrusive));
    push_ident(&mut out, "Target Timer Rate", &harness.ticks_per_sec().to_string());
    push_ident(
        &mut out,
        "Target Timer Granularity",
        &harness.tick_granularity().to_string(),
    );
    // With digest checking on, the recommended count is a hard requirement.
    let iterations_label = if verify.digest.is_enabled() {
        "Required Iterations"
    } else {
        "Recommended Iterations"
    };
    push_ident(&mut out, iterations_label, &tc.rec_iterations.to_string());
    if tc.iterations != tc.rec_iterations {
        push_ident(&mut out, "Programmed Iterations", &tc.iterations.to_string());
    }
    push_ident(&mut out, "Bench Mark", &tc.desc);

    match verify.digest {
        DigestMode::Intrusive => {
            push_result(&mut out, "Intrusive CRC", &format!("{:4x}", tc.digest))
        }
        DigestMode::NonIntrusive => {
            push_result(&mut out, "Non-Intrusive CRC", &format!("{:4x}", tc.digest))
        }
        DigestMode::Off => push_result(&mut out, "No CRC check", "0000"),
    }
    push_result(&mut out, "Iterations", &format!("{:5}", tc.iterations));
    if tc.duration == UNDEFINED_DURATION {
        push_result(&mut out, "Target Duration", "undefined");
    } else {
        push_result(&mut out, "Target Duration", &format!("{:5}", tc.duration));
    }

    if verify.verify_int {
        push_result(&mut out, "v1", &tc.v1.to_string());
        push_result(&mut out, "v2", &tc.v2.to_string());
        push_result(&mut out, "v3", &tc.v3.to_string());
        push_result(&mut out, "v4", &tc.v4.to_string());
    }
    if verify.verify_float && caps.float_support {
        let (v1v2, v3v4) = tc.verify_doubles();
        push_result(&mut out, "v1v2", &format!("{:.6}", v1v2));
        push_result(&mut out, "v3v4", &format!("{:.6}", v3v4));
    }

    if caps.timer_available {
        let rate = harness.ticks_per_sec();
        if let (Some(total), Some(per_sec)) = (
            seconds(tc.duration, rate),
            iterations_per_sec(tc.iterations, tc.duration, rate),
        ) {
            push_result(&mut out, "Iterations/Sec", &format!("{:12.3}", per_sec));
            push_result(&mut out, "Total Run Time", &format!("{:12.3}sec", total));
            push_result(&mut out, "Time / Iter", &format!("{:18.9}sec", 1.0 / per_sec));
        }
    }

    if verdict.digest_failed {
        out.push_str(&format!(
            "--  Failure: Actual CRC {:x}, Expected CRC {:x}\n",
            tc.digest, expected_digest
        ));
    }
    if verdict.iterations_failed {
        out.push_str(&format!(
            "--  Failure: Actual iterations {}, Expected iterations {}\n",
            tc.iterations, tc.rec_iterations
        ));
    }

    let status = verdict.status();
    if status.is_success() {
        out.push_str(">> DONE!\n");
    } else {
        out.push_str(&format!(">> Failure: {}\n", status.code()));
    }

    out
}

/// The closing lines after the platform hook.
pub(crate) fn render_footer(tc: &TestCase) -> String {
    format!(">> BM: {}\n>> ID: {}\n\n", tc.desc, tc.bm_id)
}
