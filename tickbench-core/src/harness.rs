//! Bound Harness Handle
//!
//! `Harness::bind` resolves a [`Platform`] into the handle benchmark code
//! runs against: identification, normalized capability flags, verification
//! configuration, and the run-phase state machine. Everything except the
//! phase cell is immutable after bind, so the handle can be shared freely;
//! the single atomic phase enforces that measurement windows never nest or
//! repeat without an explicit reset.

use std::alloc::Layout;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::config::VerifyConfig;
use crate::platform::{
    Platform, TargetCaps, TargetIdent, TestFile, Version, HARNESS_REVISION, HARNESS_VERSION,
};
use crate::status::Status;
use crate::testcase::TestCase;
use crate::timing::UNDEFINED_DURATION;

/// Benchmark entry point: receives the bound harness and its descriptor,
/// returns the verification status.
pub type BenchFn = fn(&Harness, &mut TestCase) -> Status;

/// Run phase of the one in-flight measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// No measurement window is open
    Idle = 0,
    /// Between `signal_start` and `signal_finished`
    Running = 1,
    /// The window closed; `prepare_run` re-arms the harness
    Finished = 2,
}

impl Phase {
    fn from_u8(raw: u8) -> Phase {
        match raw {
            0 => Phase::Idle,
            1 => Phase::Running,
            _ => Phase::Finished,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Finished => "finished",
        })
    }
}

/// Fatal misuse of the harness contract.
///
/// These are not test outcomes: they mean the benchmark and the harness
/// were mismatched or misordered. They surface through the terminal exit
/// path with a source location, never as a soft fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The platform was written against a different table layout
    #[error("capability table revision {found} is not supported (harness implements revision {expected})")]
    UnsupportedRevision {
        /// Revision the platform advertises
        found: u16,
        /// Revision this harness implements
        expected: u16,
    },
    /// `signal_start` outside the idle phase
    #[error("start signaled in the {found} phase")]
    StartOutOfOrder {
        /// Phase the harness was in
        found: Phase,
    },
    /// `signal_finished` outside the running phase
    #[error("finish signaled in the {found} phase")]
    FinishOutOfOrder {
        /// Phase the harness was in
        found: Phase,
    },
    /// Allocation requested while no platform owned the redirection slot
    #[error("allocation requested before a platform was installed")]
    AllocBeforeInstall,
}

fn fatal(platform: &dyn Platform, violation: &ContractViolation, site: &Location<'_>) -> ! {
    platform.write_fmt(format_args!(
        "Contract violation: {}\nFile: {} at {}\n",
        violation,
        site.file(),
        site.line()
    ));
    platform.exit(Status::Failure.code())
}

/// The bound capability table handed to benchmark code.
pub struct Harness {
    platform: Arc<dyn Platform>,
    ident: TargetIdent,
    caps: TargetCaps,
    verify: VerifyConfig,
    harness_version: Version,
    target_version: Version,
    phase: AtomicU8,
}

impl Harness {
    /// Bind a platform into a harness handle.
    ///
    /// Checks the platform's capability table revision before anything else
    /// and terminates through the platform exit path on a mismatch.
    /// Capability flags are normalized at this point; a target without a
    /// timer never reports an intrusive one.
    #[track_caller]
    pub fn bind(platform: Arc<dyn Platform>, ident: TargetIdent, verify: VerifyConfig) -> Harness {
        let found = platform.revision();
        if found != HARNESS_REVISION {
            let violation = ContractViolation::UnsupportedRevision {
                found,
                expected: HARNESS_REVISION,
            };
            fatal(&*platform, &violation, Location::caller());
        }

        let raw = platform.capabilities();
        let caps = raw.normalized();
        if caps != raw {
            tracing::warn!(
                "target reports an intrusive timer but no timer; treating it as non-intrusive"
            );
        }

        let target_version = platform.target_version();
        tracing::debug!(
            member = %ident.member,
            processor = %ident.processor,
            platform = %ident.platform,
            revision = found,
            "bound capability table"
        );

        Harness {
            platform,
            ident,
            caps,
            verify,
            harness_version: HARNESS_VERSION,
            target_version,
            phase: AtomicU8::new(Phase::Idle as u8),
        }
    }

    /// Open the measurement window and arm the platform timer if the target
    /// has one. Zero arguments and constant cost; results travel separately
    /// through the verification protocol.
    #[track_caller]
    pub fn signal_start(&self) {
        let site = Location::caller();
        if let Err(found) = self.phase.compare_exchange(
            Phase::Idle as u8,
            Phase::Running as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            let violation = ContractViolation::StartOutOfOrder {
                found: Phase::from_u8(found),
            };
            fatal(&*self.platform, &violation, site);
        }
        if self.caps.timer_available {
            self.platform.start_timer();
        }
    }

    /// Close the measurement window. Returns the elapsed tick count, or
    /// [`UNDEFINED_DURATION`] when the target has no timer.
    #[track_caller]
    pub fn signal_finished(&self) -> u64 {
        let site = Location::caller();
        if let Err(found) = self.phase.compare_exchange(
            Phase::Running as u8,
            Phase::Finished as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            let violation = ContractViolation::FinishOutOfOrder {
                found: Phase::from_u8(found),
            };
            fatal(&*self.platform, &violation, site);
        }
        if self.caps.timer_available {
            self.platform.stop_timer()
        } else {
            UNDEFINED_DURATION
        }
    }

    /// Re-arm the harness for another invocation. The next `signal_start`
    /// opens a fresh measurement window.
    pub fn prepare_run(&self) {
        self.phase.store(Phase::Idle as u8, Ordering::SeqCst);
    }

    /// Current run phase.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Give the host control channel a chance to request early termination.
    /// Returns false exactly when a stop has been requested; the caller
    /// must then unwind and terminate. Never call this inside a measured
    /// region.
    pub fn poll(&self) -> bool {
        self.platform.poll()
    }

    /// Emit a formatted message through the console capability, then yield
    /// control to the platform's terminal exit path.
    pub fn exit_with(&self, code: i32, args: fmt::Arguments<'_>) -> ! {
        self.platform.write_fmt(args);
        self.platform.exit(code)
    }

    /// The platform behind this harness.
    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    /// Target identification strings.
    pub fn ident(&self) -> &TargetIdent {
        &self.ident
    }

    /// Normalized capability flags.
    pub fn caps(&self) -> TargetCaps {
        self.caps
    }

    /// Verification configuration for this run.
    pub fn verify(&self) -> VerifyConfig {
        self.verify
    }

    /// Version of this harness.
    pub fn harness_version(&self) -> Version {
        self.harness_version
    }

    /// Version of the target hardware or abstraction layer.
    pub fn target_version(&self) -> Version {
        self.target_version
    }

    /// Whether the target has a usable duration timer.
    pub fn timer_available(&self) -> bool {
        self.caps.timer_available
    }

    /// Whether reading the timer perturbs the measured region.
    pub fn timer_is_intrusive(&self) -> bool {
        self.caps.timer_intrusive
    }

    /// Timer rate in ticks per second.
    pub fn ticks_per_sec(&self) -> u64 {
        self.platform.ticks_per_sec()
    }

    /// Minimum observable timer increment in ticks.
    pub fn tick_granularity(&self) -> u64 {
        self.platform.tick_granularity()
    }

    /// Write a string to the target console.
    pub fn send_str(&self, s: &str) {
        self.platform.send_str(s);
    }

    /// Write formatted output to the target console.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) {
        self.platform.write_fmt(args);
    }

    /// Allocate a block through the platform allocator, recording the
    /// requesting call-site.
    #[track_caller]
    pub fn malloc(&self, layout: Layout) -> *mut u8 {
        self.platform.alloc(layout, Location::caller())
    }

    /// Release a block obtained from [`malloc`](Harness::malloc).
    #[track_caller]
    pub fn release(&self, ptr: *mut u8, layout: Layout) {
        self.platform.release(ptr, layout, Location::caller());
    }

    /// Return the target heap to its pristine state, where supported.
    pub fn heap_reset(&self) {
        self.platform.heap_reset();
    }

    /// Look up a published input file by name.
    pub fn file_by_name(&self, name: &str) -> Option<Arc<TestFile>> {
        self.platform.file_by_name(name)
    }

    /// Look up a published input file by position.
    pub fn file_by_index(&self, index: usize) -> Option<Arc<TestFile>> {
        self.platform.file_by_index(index)
    }

    /// Send a buffer back to the host as a named file.
    pub fn send_file(&self, name: &str, data: &[u8]) -> bool {
        self.platform.send_file(name, data)
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("ident", &self.ident)
            .field("caps", &self.caps)
            .field("verify", &self.verify)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
