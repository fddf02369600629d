//! Host-Process Target
//!
//! [`HostPlatform`] runs benchmarks directly in the invoking process:
//! console output goes to stdout, the duration timer is the monotonic
//! clock at nanosecond resolution, and `exit` terminates the process.
//! Useful for developing a benchmark on a workstation before pointing it
//! at real hardware.

use std::io::Write;
use std::process;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tickbench_core::{Platform, TargetCaps, TestFile, UNDEFINED_DURATION};

/// A target backed by the invoking process.
pub struct HostPlatform {
    started: Mutex<Option<Instant>>,
    files: Vec<Arc<TestFile>>,
}

impl HostPlatform {
    /// A host target with no published files.
    pub fn new() -> Self {
        Self {
            started: Mutex::new(None),
            files: Vec::new(),
        }
    }

    /// Publish an input file to benchmark code.
    pub fn with_file(mut self, name: &str, data: &[u8]) -> Self {
        self.files.push(Arc::new(TestFile {
            name: name.to_string(),
            data: data.to_vec(),
        }));
        self
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HostPlatform {
    fn capabilities(&self) -> TargetCaps {
        TargetCaps::default()
    }

    fn write_console(&self, bytes: &[u8]) -> usize {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match out.write_all(bytes).and_then(|_| out.flush()) {
            Ok(()) => bytes.len(),
            Err(_) => 0,
        }
    }

    fn ticks_per_sec(&self) -> u64 {
        1_000_000_000
    }

    fn tick_granularity(&self) -> u64 {
        1
    }

    fn start_timer(&self) {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        *started = Some(Instant::now());
    }

    fn stop_timer(&self) -> u64 {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        match started.take() {
            Some(at) => at.elapsed().as_nanos() as u64,
            None => UNDEFINED_DURATION,
        }
    }

    fn exit(&self, code: i32) -> ! {
        process::exit(code)
    }

    fn file_by_name(&self, name: &str) -> Option<Arc<TestFile>> {
        self.files.iter().find(|f| f.name == name).cloned()
    }

    fn file_by_index(&self, index: usize) -> Option<Arc<TestFile>> {
        self.files.get(index).cloned()
    }

    fn send_file(&self, name: &str, data: &[u8]) -> bool {
        match std::fs::write(name, data) {
            Ok(()) => {
                tracing::debug!(name = %name, bytes = data.len(), "wrote file from target");
                true
            }
            Err(error) => {
                tracing::warn!(name = %name, %error, "failed to write file from target");
                false
            }
        }
    }
}
