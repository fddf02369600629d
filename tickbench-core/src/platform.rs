//! Platform Capability Table
//!
//! The `Platform` trait is the contract between target-independent benchmark
//! code and a target-specific abstraction layer. A concrete implementation is
//! constructed once per target, bound into a [`Harness`](crate::Harness), and
//! read-only from then on. Capabilities a target does not have keep their
//! default stub implementations, so probing an absent capability is always a
//! harmless no-op rather than a panic or a null dereference.

use std::alloc::{GlobalAlloc, Layout, System};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::timing::UNDEFINED_DURATION;

/// Capability table layout revision implemented by this harness.
///
/// A platform advertising any other revision is rejected at bind time.
pub const HARNESS_REVISION: u16 = 4;

/// Harness component identifier printed in report headers.
pub const HARNESS_ID: &str = "Tickbench Test Harness";

/// Version advertised by this harness build.
pub const HARNESS_VERSION: Version = Version { major: 0, minor: 4 };

/// Width of the fixed identification fields (member, processor, platform, id).
pub const IDENT_LEN: usize = 16;

/// Width of the fixed benchmark description field.
pub const DESC_LEN: usize = 64;

/// Call-site recorded with allocation requests for diagnostics.
pub type AllocSite = &'static Location<'static>;

/// A major/minor version pair for the harness and the target hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Version {
    /// Major version component
    pub major: u16,
    /// Minor version component
    pub minor: u16,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Target capability flags surfaced in every report.
///
/// `timer_intrusive` marks timers whose start/stop calls consume enough
/// target cycles to perturb the measurement; reports carry the flag so
/// readers can weigh the numbers accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCaps {
    /// The target has a usable duration timer
    pub timer_available: bool,
    /// Reading the timer perturbs the measured region
    pub timer_intrusive: bool,
    /// The target supports floating point arithmetic
    pub float_support: bool,
}

impl Default for TargetCaps {
    fn default() -> Self {
        Self {
            timer_available: true,
            timer_intrusive: false,
            float_support: true,
        }
    }
}

impl TargetCaps {
    /// A target with no timer cannot have an intrusive one. Returns the
    /// flags with that implication enforced.
    pub fn normalized(mut self) -> Self {
        if !self.timer_available {
            self.timer_intrusive = false;
        }
        self
    }
}

/// Target identification strings carried into every report.
///
/// Fields are clipped to the fixed widths of the report format at
/// construction, mirroring the fixed-size character arrays of the wire
/// layout this harness descends from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetIdent {
    /// Member company running the benchmark
    pub member: String,
    /// Target processor name
    pub processor: String,
    /// Target board or platform name
    pub platform: String,
}

impl TargetIdent {
    /// Build an identification block, clipping each field to [`IDENT_LEN`].
    pub fn new(member: &str, processor: &str, platform: &str) -> Self {
        Self {
            member: clip(member, IDENT_LEN),
            processor: clip(processor, IDENT_LEN),
            platform: clip(platform, IDENT_LEN),
        }
    }
}

impl Default for TargetIdent {
    fn default() -> Self {
        Self::new("unknown", "unknown", "unknown")
    }
}

/// A named input file published by the platform to benchmark code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFile {
    /// Lookup name
    pub name: String,
    /// File contents
    pub data: Vec<u8>,
}

pub(crate) fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// The abstraction-layer contract a target implements.
///
/// Required methods: [`capabilities`](Platform::capabilities),
/// [`write_console`](Platform::write_console) and [`exit`](Platform::exit).
/// Every other entry point has a stub default so a minimal target is exactly
/// three methods. Implementations must be safe to call from behind a shared
/// reference; the harness never takes a platform by `&mut`.
pub trait Platform: Send + Sync {
    /// Capability flags for this target.
    fn capabilities(&self) -> TargetCaps;

    /// Capability table revision this platform was written against.
    fn revision(&self) -> u16 {
        HARNESS_REVISION
    }

    /// Version of the target hardware or abstraction layer.
    fn target_version(&self) -> Version {
        Version::default()
    }

    /// Write raw bytes to the target console. Returns the number of bytes
    /// actually written.
    fn write_console(&self, bytes: &[u8]) -> usize;

    /// Write a string to the console.
    fn send_str(&self, s: &str) {
        self.write_console(s.as_bytes());
    }

    /// Write a single character to the console.
    fn put_char(&self, c: u8) {
        self.write_console(std::slice::from_ref(&c));
    }

    /// Read pending console input into `buf`. Returns the number of bytes
    /// read; 0 when the target has no input channel.
    fn read_console(&self, _buf: &mut [u8]) -> usize {
        0
    }

    /// Number of console input bytes available without blocking.
    fn input_available(&self) -> usize {
        0
    }

    /// Write formatted output to the console.
    fn write_fmt(&self, args: fmt::Arguments<'_>) {
        self.send_str(&args.to_string());
    }

    /// Timer rate in ticks per second. 0 when no timer is available.
    fn ticks_per_sec(&self) -> u64 {
        0
    }

    /// Minimum observable timer increment in ticks.
    ///
    /// A rate of 1000 with granularity 10 means the hardware counter moves
    /// in steps of 10 ticks; reports surface this so throughput figures are
    /// not mistaken for finer-grained measurements than the hardware gives.
    fn tick_granularity(&self) -> u64 {
        0
    }

    /// Arm the duration timer.
    fn start_timer(&self) {}

    /// Stop the duration timer and return the elapsed tick count, or
    /// [`UNDEFINED_DURATION`] when no timer backs the measurement.
    fn stop_timer(&self) -> u64 {
        UNDEFINED_DURATION
    }

    /// Allocate a block for benchmark code. `site` records the requesting
    /// call-site for diagnostics. Zero-sized layouts yield a null pointer.
    ///
    /// The default routes through the system allocator rather than the
    /// global one, so it stays usable while
    /// [`RedirectAllocator`](crate::RedirectAllocator) is the global
    /// allocator.
    fn alloc(&self, layout: Layout, _site: AllocSite) -> *mut u8 {
        if layout.size() == 0 {
            return std::ptr::null_mut();
        }
        unsafe { System.alloc(layout) }
    }

    /// Release a block obtained from [`alloc`](Platform::alloc).
    fn release(&self, ptr: *mut u8, layout: Layout, _site: AllocSite) {
        if ptr.is_null() || layout.size() == 0 {
            return;
        }
        unsafe { System.dealloc(ptr, layout) }
    }

    /// Return the target heap to its pristine state, where supported.
    fn heap_reset(&self) {}

    /// Give a host control channel a chance to request early termination.
    /// Returns false exactly when a stop has been requested. Must never be
    /// called inside a measured region.
    fn poll(&self) -> bool {
        true
    }

    /// Terminal exit path. Never returns.
    fn exit(&self, code: i32) -> !;

    /// User print hook invoked after the fixed results block of a report.
    fn report_hook(&self) {}

    /// Look up a published input file by name.
    fn file_by_name(&self, _name: &str) -> Option<Arc<TestFile>> {
        None
    }

    /// Look up a published input file by position.
    fn file_by_index(&self, _index: usize) -> Option<Arc<TestFile>> {
        None
    }

    /// Send a buffer back to the host as a named file. Returns true when the
    /// target has a file channel and accepted the transfer.
    fn send_file(&self, _name: &str, _data: &[u8]) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A target implementing only the three required methods.
    struct MinimalTarget {
        console: Mutex<Vec<u8>>,
    }

    impl MinimalTarget {
        fn new() -> Self {
            Self {
                console: Mutex::new(Vec::new()),
            }
        }
    }

    impl Platform for MinimalTarget {
        fn capabilities(&self) -> TargetCaps {
            TargetCaps {
                timer_available: false,
                timer_intrusive: false,
                float_support: false,
            }
        }

        fn write_console(&self, bytes: &[u8]) -> usize {
            self.console.lock().unwrap().extend_from_slice(bytes);
            bytes.len()
        }

        fn exit(&self, code: i32) -> ! {
            panic!("exit({code})");
        }
    }

    #[test]
    fn default_stubs_are_noops() {
        let target = MinimalTarget::new();
        assert!(target.poll());
        assert_eq!(target.stop_timer(), UNDEFINED_DURATION);
        assert_eq!(target.ticks_per_sec(), 0);
        assert_eq!(target.tick_granularity(), 0);
        assert_eq!(target.input_available(), 0);
        assert_eq!(target.read_console(&mut [0u8; 8]), 0);
        assert!(target.file_by_name("any").is_none());
        assert!(target.file_by_index(0).is_none());
        assert!(!target.send_file("out.log", b"data"));
        assert_eq!(target.revision(), HARNESS_REVISION);
    }

    #[test]
    fn send_str_routes_through_write_console() {
        let target = MinimalTarget::new();
        target.send_str("hello");
        target.put_char(b'!');
        target.write_fmt(format_args!(" {}", 42));
        assert_eq!(&*target.console.lock().unwrap(), b"hello! 42");
    }

    #[test]
    fn default_alloc_round_trips_through_system() {
        let target = MinimalTarget::new();
        let layout = Layout::from_size_align(64, 8).unwrap();
        let site = Location::caller();
        let ptr = target.alloc(layout, site);
        assert!(!ptr.is_null());
        target.release(ptr, layout, site);

        let zero = Layout::from_size_align(0, 1).unwrap();
        assert!(target.alloc(zero, site).is_null());
    }

    #[test]
    fn ident_fields_are_clipped() {
        let ident = TargetIdent::new(
            "a-member-name-that-runs-long",
            "processor",
            "platform",
        );
        assert_eq!(ident.member.len(), IDENT_LEN);
        assert_eq!(ident.member, "a-member-name-th");
        assert_eq!(ident.processor, "processor");
    }

    #[test]
    fn caps_normalization_forces_intrusive_off() {
        let caps = TargetCaps {
            timer_available: false,
            timer_intrusive: true,
            float_support: true,
        };
        let normalized = caps.normalized();
        assert!(!normalized.timer_intrusive);
        assert!(!normalized.timer_available);

        // An available timer keeps its intrusiveness flag.
        let caps = TargetCaps {
            timer_available: true,
            timer_intrusive: true,
            float_support: true,
        };
        assert!(caps.normalized().timer_intrusive);
    }

    #[test]
    fn version_displays_as_dotted_pair() {
        assert_eq!(HARNESS_VERSION.to_string(), "0.4");
        assert_eq!(Version { major: 2, minor: 11 }.to_string(), "2.11");
    }
}
