//! Scripted Simulation Target
//!
//! [`SimPlatform`] is a fully in-memory target with a manually advanced
//! tick clock and a captured console. Tests script it: configure the
//! capability flags, advance the clock inside a measurement window, and
//! assert on the exact bytes the harness produced. Its `exit` raises a
//! [`SimExit`] panic payload so terminal paths can be observed with
//! `catch_unwind` instead of ending the test process.

use std::alloc::{GlobalAlloc, Layout, System};
use std::collections::VecDeque;
use std::panic::panic_any;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tickbench_core::{AllocSite, Platform, TargetCaps, TestFile, Version, HARNESS_REVISION};

/// Panic payload raised by [`SimPlatform::exit`], carrying the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimExit(pub i32);

/// An in-memory target with a scripted clock.
pub struct SimPlatform {
    caps: TargetCaps,
    revision: u16,
    ticks_per_sec: u64,
    granularity: u64,
    clock: AtomicU64,
    armed_at: AtomicU64,
    console: Mutex<Vec<u8>>,
    input: Mutex<VecDeque<u8>>,
    stop_requested: AtomicBool,
    allocs: AtomicUsize,
    releases: AtomicUsize,
    heap_resets: AtomicUsize,
    files: Vec<Arc<TestFile>>,
    sent: Mutex<Vec<TestFile>>,
    hook_line: Option<String>,
}

impl SimPlatform {
    /// A target with the default capability set: 1000 ticks per second,
    /// non-intrusive timer, floating point support.
    pub fn new() -> Self {
        Self {
            caps: TargetCaps::default(),
            revision: HARNESS_REVISION,
            ticks_per_sec: 1000,
            granularity: 1,
            clock: AtomicU64::new(0),
            armed_at: AtomicU64::new(0),
            console: Mutex::new(Vec::new()),
            input: Mutex::new(VecDeque::new()),
            stop_requested: AtomicBool::new(false),
            allocs: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            heap_resets: AtomicUsize::new(0),
            files: Vec::new(),
            sent: Mutex::new(Vec::new()),
            hook_line: None,
        }
    }

    /// Drop the duration timer capability.
    pub fn without_timer(mut self) -> Self {
        self.caps.timer_available = false;
        self
    }

    /// Mark the timer as intrusive.
    pub fn intrusive_timer(mut self) -> Self {
        self.caps.timer_intrusive = true;
        self
    }

    /// Drop floating point support.
    pub fn without_float(mut self) -> Self {
        self.caps.float_support = false;
        self
    }

    /// Override the timer rate.
    pub fn with_ticks_per_sec(mut self, ticks: u64) -> Self {
        self.ticks_per_sec = ticks;
        self
    }

    /// Override the timer granularity.
    pub fn with_granularity(mut self, ticks: u64) -> Self {
        self.granularity = ticks;
        self
    }

    /// Advertise a different capability table revision.
    pub fn with_revision(mut self, revision: u16) -> Self {
        self.revision = revision;
        self
    }

    /// Publish an input file to benchmark code.
    pub fn with_file(mut self, name: &str, data: &[u8]) -> Self {
        self.files.push(Arc::new(TestFile {
            name: name.to_string(),
            data: data.to_vec(),
        }));
        self
    }

    /// Emit `line` from the report hook.
    pub fn with_report_hook_line(mut self, line: &str) -> Self {
        self.hook_line = Some(line.to_string());
        self
    }

    /// Advance the scripted clock by `ticks`.
    pub fn advance(&self, ticks: u64) {
        self.clock.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Everything written to the console so far, lossily decoded.
    pub fn console_text(&self) -> String {
        let console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&console).into_owned()
    }

    /// Discard the captured console.
    pub fn clear_console(&self) {
        self.console
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Make the next [`poll`](Platform::poll) report a stop request.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Queue bytes on the console input channel.
    pub fn push_input(&self, bytes: &[u8]) {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(bytes.iter().copied());
    }

    /// Number of allocations served.
    pub fn allocs(&self) -> usize {
        self.allocs.load(Ordering::SeqCst)
    }

    /// Number of blocks released.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Number of heap resets requested.
    pub fn heap_resets(&self) -> usize {
        self.heap_resets.load(Ordering::SeqCst)
    }

    /// Files benchmark code sent back to the host.
    pub fn sent_files(&self) -> Vec<TestFile> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SimPlatform {
    fn capabilities(&self) -> TargetCaps {
        self.caps
    }

    fn revision(&self) -> u16 {
        self.revision
    }

    fn target_version(&self) -> Version {
        Version { major: 1, minor: 0 }
    }

    fn write_console(&self, bytes: &[u8]) -> usize {
        self.console
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        bytes.len()
    }

    fn read_console(&self, buf: &mut [u8]) -> usize {
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        let mut read = 0;
        while read < buf.len() {
            match input.pop_front() {
                Some(byte) => {
                    buf[read] = byte;
                    read += 1;
                }
                None => break,
            }
        }
        read
    }

    fn input_available(&self) -> usize {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn ticks_per_sec(&self) -> u64 {
        self.ticks_per_sec
    }

    fn tick_granularity(&self) -> u64 {
        self.granularity
    }

    fn start_timer(&self) {
        self.armed_at
            .store(self.clock.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    fn stop_timer(&self) -> u64 {
        self.clock.load(Ordering::SeqCst) - self.armed_at.load(Ordering::SeqCst)
    }

    fn alloc(&self, layout: Layout, _site: AllocSite) -> *mut u8 {
        self.allocs.fetch_add(1, Ordering::SeqCst);
        if layout.size() == 0 {
            return std::ptr::null_mut();
        }
        unsafe { System.alloc(layout) }
    }

    fn release(&self, ptr: *mut u8, layout: Layout, _site: AllocSite) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if ptr.is_null() || layout.size() == 0 {
            return;
        }
        unsafe { System.dealloc(ptr, layout) }
    }

    fn heap_reset(&self) {
        self.heap_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn poll(&self) -> bool {
        !self.stop_requested.load(Ordering::SeqCst)
    }

    fn exit(&self, code: i32) -> ! {
        panic_any(SimExit(code));
    }

    fn report_hook(&self) {
        if let Some(line) = &self.hook_line {
            self.write_console(line.as_bytes());
            self.write_console(b"\n");
        }
    }

    fn file_by_name(&self, name: &str) -> Option<Arc<TestFile>> {
        self.files.iter().find(|f| f.name == name).cloned()
    }

    fn file_by_index(&self, index: usize) -> Option<Arc<TestFile>> {
        self.files.get(index).cloned()
    }

    fn send_file(&self, name: &str, data: &[u8]) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TestFile {
                name: name.to_string(),
                data: data.to_vec(),
            });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn scripted_clock_measures_windows() {
        let sim = SimPlatform::new();
        sim.advance(40);
        sim.start_timer();
        sim.advance(110);
        assert_eq!(sim.stop_timer(), 110);
    }

    #[test]
    fn console_captures_and_clears() {
        let sim = SimPlatform::new();
        sim.send_str("alpha ");
        sim.write_fmt(format_args!("{}", 9));
        assert_eq!(sim.console_text(), "alpha 9");
        sim.clear_console();
        assert_eq!(sim.console_text(), "");
    }

    #[test]
    fn poll_reflects_stop_requests() {
        let sim = SimPlatform::new();
        assert!(sim.poll());
        sim.request_stop();
        assert!(!sim.poll());
    }

    #[test]
    fn input_round_trips() {
        let sim = SimPlatform::new();
        sim.push_input(b"go\n");
        assert_eq!(sim.input_available(), 3);
        let mut buf = [0u8; 2];
        assert_eq!(sim.read_console(&mut buf), 2);
        assert_eq!(&buf, b"go");
        assert_eq!(sim.input_available(), 1);
    }

    #[test]
    fn files_are_published_and_captured() {
        let sim = SimPlatform::new().with_file("input.dat", b"\x01\x02");
        assert_eq!(sim.file_by_name("input.dat").unwrap().data, vec![1, 2]);
        assert!(sim.file_by_name("absent").is_none());
        assert_eq!(sim.file_by_index(0).unwrap().name, "input.dat");

        assert!(sim.send_file("out.log", b"done"));
        let sent = sim.sent_files();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "out.log");
        assert_eq!(sent[0].data, b"done");
    }

    #[test]
    fn exit_raises_a_catchable_payload() {
        let sim = SimPlatform::new();
        let payload =
            catch_unwind(AssertUnwindSafe(|| sim.exit(8))).expect_err("exit must not return");
        assert_eq!(payload.downcast_ref::<SimExit>(), Some(&SimExit(8)));
    }

    #[test]
    fn allocator_counters_track_usage() {
        let sim = SimPlatform::new();
        let layout = Layout::from_size_align(24, 8).unwrap();
        let site = std::panic::Location::caller();
        let ptr = sim.alloc(layout, site);
        assert!(!ptr.is_null());
        sim.release(ptr, layout, site);
        sim.heap_reset();
        assert_eq!(sim.allocs(), 1);
        assert_eq!(sim.releases(), 1);
        assert_eq!(sim.heap_resets(), 1);
    }
}
