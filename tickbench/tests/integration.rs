//! Integration tests for the tickbench harness
//!
//! These tests drive complete benchmark invocations against the scripted
//! simulation target and assert on the exact console surface automated
//! log readers depend on.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tickbench::{
    install_redirect, redirect_installed, report_results, uninstall_redirect, DigestMode, Harness,
    SimExit, SimPlatform, Status, TargetIdent, TestCase, VerifyConfig, UNDEFINED_DURATION,
};

fn bind(sim: Arc<SimPlatform>, verify: VerifyConfig) -> Harness {
    Harness::bind(
        sim,
        TargetIdent::new("acme", "sim-core", "loopback"),
        verify,
    )
}

/// Drive one run: open the window, spend `ticks`, close it, record the
/// digest, and report.
fn run_once(
    harness: &Harness,
    sim: &SimPlatform,
    tc: &mut TestCase,
    ticks: u64,
    digest: u16,
    expected: u16,
) -> Status {
    harness.signal_start();
    sim.advance(ticks);
    tc.duration = harness.signal_finished();
    tc.digest = digest;
    report_results(harness, tc, expected)
}

/// A conforming run produces the canonical report byte for byte
#[test]
fn test_passing_run_produces_exact_report() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());
    let mut tc = TestCase::new("tel-fir", "Finite impulse response filter", 100);

    let status = run_once(&harness, &sim, &mut tc, 500, 0xBEEF, 0xBEEF);
    assert_eq!(status, Status::Success);

    let expected = ">>------------------------------------------------------------
>> Harness Component        : Tickbench Test Harness v0.4
>> Member Company           : acme
>> Target Processor         : sim-core
>> Target Platform          : loopback
>> Target Timer Available   : YES
>> Target Timer Intrusive   : NO
>> Target Timer Rate        : 1000
>> Target Timer Granularity : 1
>> Required Iterations      : 100
>> Bench Mark               : Finite impulse response filter
--  Non-Intrusive CRC = beef
--  Iterations        =   100
--  Target Duration   =   500
--  Iterations/Sec    =      200.000
--  Total Run Time    =        0.500sec
--  Time / Iter       =        0.005000000sec
>> DONE!
>> BM: Finite impulse response filter
>> ID: tel-fir

";
    assert_eq!(sim.console_text(), expected);
}

/// An iteration shortfall fails with decimal values; timing lines still
/// print for the achieved count
#[test]
fn test_iteration_shortfall_fails_in_decimal() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());
    let mut tc = TestCase::new("bm-x", "a benchmark", 100);
    tc.iterations = 99;

    let status = run_once(&harness, &sim, &mut tc, 500, 0xBEEF, 0xBEEF);
    assert_eq!(status, Status::Failure);

    let text = sim.console_text();
    assert!(text.contains(">> Programmed Iterations    : 99\n"));
    assert!(text.contains("--  Failure: Actual iterations 99, Expected iterations 100\n"));
    assert!(text.contains(">> Failure: 1\n"));
    assert!(text.contains("--  Iterations/Sec"));
    assert!(!text.contains("Actual CRC"));
    assert!(!text.contains(">> DONE!"));
}

/// With digest checking off, a digest mismatch cannot fail the run
#[test]
fn test_digest_off_leaves_only_the_iteration_check() {
    let sim = Arc::new(SimPlatform::new());
    let verify = VerifyConfig {
        digest: DigestMode::Off,
        ..VerifyConfig::default()
    };
    let harness = bind(sim.clone(), verify);
    let mut tc = TestCase::new("bm-x", "a benchmark", 100);

    let status = run_once(&harness, &sim, &mut tc, 500, 0xDEAD, 0xBEEF);
    assert_eq!(status, Status::Success);

    let text = sim.console_text();
    assert!(text.contains(">> Recommended Iterations   : 100\n"));
    assert!(text.contains("--  No CRC check      = 0000\n"));
    assert!(text.contains(">> DONE!\n"));
}

/// Digest and iteration checks fail independently; both report
#[test]
fn test_both_checks_fail_with_both_lines() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());
    let mut tc = TestCase::new("bm-x", "a benchmark", 100);
    tc.iterations = 99;

    let status = run_once(&harness, &sim, &mut tc, 500, 0x1A2B, 0x3C4D);
    assert_eq!(status, Status::Failure);

    let text = sim.console_text();
    assert!(text.contains("--  Failure: Actual CRC 1a2b, Expected CRC 3c4d\n"));
    assert!(text.contains("--  Failure: Actual iterations 99, Expected iterations 100\n"));
}

/// A target without a timer reports an undefined duration, no rate lines,
/// and a normalized intrusiveness flag
#[test]
fn test_timerless_target_reports_undefined_duration() {
    let sim = Arc::new(SimPlatform::new().without_timer().intrusive_timer());
    let harness = bind(sim.clone(), VerifyConfig::default());
    let mut tc = TestCase::new("bm-x", "a benchmark", 100);

    let status = run_once(&harness, &sim, &mut tc, 0, 0xBEEF, 0xBEEF);
    assert_eq!(status, Status::Success);
    assert_eq!(tc.duration, UNDEFINED_DURATION);

    let text = sim.console_text();
    assert!(text.contains(">> Target Timer Available   : NO\n"));
    assert!(text.contains(">> Target Timer Intrusive   : NO\n"));
    assert!(text.contains("--  Target Duration   = undefined\n"));
    assert!(!text.contains("Iterations/Sec"));
    assert!(!text.contains("Total Run Time"));
    assert!(text.contains(">> DONE!\n"));
}

/// Reporting an unmodified descriptor twice produces identical output
#[test]
fn test_report_is_idempotent() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());
    let mut tc = TestCase::new("bm-x", "a benchmark", 100);

    let status = run_once(&harness, &sim, &mut tc, 500, 0xBEEF, 0xBEEF);
    let first = sim.console_text();

    sim.clear_console();
    let again = report_results(&harness, &tc, 0xBEEF);
    assert_eq!(again, status);
    assert_eq!(sim.console_text(), first);
}

/// The platform print hook runs after the fixed block and before the
/// footer
#[test]
fn test_report_hook_prints_between_block_and_footer() {
    let sim = Arc::new(SimPlatform::new().with_report_hook_line("-- target: cache warm"));
    let harness = bind(sim.clone(), VerifyConfig::default());
    let mut tc = TestCase::new("bm-x", "a benchmark", 100);

    run_once(&harness, &sim, &mut tc, 500, 0xBEEF, 0xBEEF);

    let text = sim.console_text();
    let done = text.find(">> DONE!\n").expect("fixed block");
    let hook = text.find("-- target: cache warm\n").expect("hook line");
    let footer = text.find(">> BM: ").expect("footer");
    assert!(done < hook);
    assert!(hook < footer);
}

/// Closing a window that was never opened terminates through the platform
#[test]
fn test_finish_without_start_is_fatal() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());

    let payload =
        catch_unwind(AssertUnwindSafe(|| harness.signal_finished())).expect_err("must exit");
    assert_eq!(payload.downcast_ref::<SimExit>(), Some(&SimExit(1)));

    let text = sim.console_text();
    assert!(text.contains("Contract violation: finish signaled in the idle phase"));
    assert!(text.contains("File: "));
}

/// Opening a second window without a reset terminates
#[test]
fn test_double_start_is_fatal() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());
    harness.signal_start();

    let payload =
        catch_unwind(AssertUnwindSafe(|| harness.signal_start())).expect_err("must exit");
    assert_eq!(payload.downcast_ref::<SimExit>(), Some(&SimExit(1)));
    assert!(sim
        .console_text()
        .contains("Contract violation: start signaled in the running phase"));
}

/// Binding a platform that advertises the wrong table revision terminates
#[test]
fn test_revision_mismatch_is_fatal() {
    let sim = Arc::new(SimPlatform::new().with_revision(9));

    let payload = catch_unwind(AssertUnwindSafe(|| {
        bind(sim.clone(), VerifyConfig::default())
    }))
    .expect_err("must exit");
    assert_eq!(payload.downcast_ref::<SimExit>(), Some(&SimExit(1)));
    assert!(sim.console_text().contains("revision 9 is not supported"));
}

/// prepare_run re-arms the harness, so one process can run many windows
#[test]
fn test_repeated_runs_measure_independently() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());
    let mut tc = TestCase::new("bm-x", "a benchmark", 100);

    run_once(&harness, &sim, &mut tc, 300, 0xBEEF, 0xBEEF);
    assert_eq!(tc.duration, 300);

    harness.prepare_run();
    sim.clear_console();

    let status = run_once(&harness, &sim, &mut tc, 700, 0xBEEF, 0xBEEF);
    assert_eq!(status, Status::Success);
    assert_eq!(tc.duration, 700);
    assert!(sim.console_text().contains("--  Target Duration   =   700\n"));
}

/// Harness allocation entry points reach the platform allocator
#[test]
fn test_platform_allocator_is_observable() {
    let sim = Arc::new(SimPlatform::new());
    let harness = bind(sim.clone(), VerifyConfig::default());

    let layout = std::alloc::Layout::from_size_align(128, 8).unwrap();
    let ptr = harness.malloc(layout);
    assert!(!ptr.is_null());
    harness.release(ptr, layout);
    harness.heap_reset();

    assert_eq!(sim.allocs(), 1);
    assert_eq!(sim.releases(), 1);
    assert_eq!(sim.heap_resets(), 1);
}

/// The redirection slot installs, reports its state, and clears
#[test]
fn test_redirect_slot_installs_and_clears() {
    let sim = Arc::new(SimPlatform::new());
    install_redirect(sim.clone());
    assert!(redirect_installed());
    uninstall_redirect();
    assert!(!redirect_installed());
}

fn short_bench(harness: &Harness, tc: &mut TestCase) -> Status {
    harness.signal_start();
    tc.duration = harness.signal_finished();
    tc.digest = 0;
    report_results(harness, tc, 0)
}

/// The CLI runner loads configuration, binds the platform, and returns
/// the judged status
#[test]
fn test_run_with_cli_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tickbench.toml");
    std::fs::write(
        &path,
        r#"
[target]
member = "acme"
processor = "sim-core"
platform = "loopback"

[verify]
digest = "off"
"#,
    )
    .unwrap();

    let sim = Arc::new(SimPlatform::new());
    let cli = tickbench_cli::Cli {
        config: Some(path),
        iterations: None,
        verbose: false,
    };
    let tc = TestCase::new("bm-x", "a benchmark", 100);

    let status = tickbench_cli::run_with_cli(cli, sim.clone(), tc, short_bench).unwrap();
    assert_eq!(status, Status::Success);

    let text = sim.console_text();
    assert!(text.contains(">> Member Company           : acme\n"));
    assert!(text.contains("--  No CRC check      = 0000\n"));
    assert!(text.contains(">> DONE!\n"));
}
