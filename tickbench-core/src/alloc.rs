//! Heap Redirection
//!
//! Targets that manage their own heap can capture every allocation the
//! benchmark makes by installing themselves into the process-wide
//! redirection slot and declaring [`RedirectAllocator`] as the global
//! allocator. Allocation before a platform is installed is a contract
//! violation and terminates the process with the out-of-memory exit code;
//! it never degrades into a silent fallback heap.
//!
//! Platform `alloc`/`release` implementations must not allocate through
//! the global allocator themselves, or redirection recurses.

use std::alloc::{GlobalAlloc, Layout};
use std::io::Write;
use std::panic::Location;
use std::process;
use std::sync::{Arc, PoisonError, RwLock};

use crate::harness::ContractViolation;
use crate::platform::Platform;
use crate::status::Status;

static REDIRECT: RwLock<Option<Arc<dyn Platform>>> = RwLock::new(None);

/// Route global allocations through `platform` until
/// [`uninstall_redirect`] is called. Replaces any previously installed
/// platform.
pub fn install_redirect(platform: Arc<dyn Platform>) {
    let displaced = {
        let mut slot = REDIRECT.write().unwrap_or_else(PoisonError::into_inner);
        slot.replace(platform)
    };
    // Dropping the displaced Arc may itself allocate or free; that must
    // happen outside the lock or the redirecting allocator deadlocks.
    drop(displaced);
}

/// Clear the redirection slot. Later allocations through
/// [`RedirectAllocator`] are contract violations again.
pub fn uninstall_redirect() {
    let displaced = {
        let mut slot = REDIRECT.write().unwrap_or_else(PoisonError::into_inner);
        slot.take()
    };
    drop(displaced);
}

/// Whether a platform currently owns the redirection slot.
pub fn redirect_installed() -> bool {
    REDIRECT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

fn current() -> Option<Arc<dyn Platform>> {
    REDIRECT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn try_alloc(layout: Layout, site: &'static Location<'static>) -> Result<*mut u8, ContractViolation> {
    match current() {
        Some(platform) => Ok(platform.alloc(layout, site)),
        None => Err(ContractViolation::AllocBeforeInstall),
    }
}

fn die(violation: &ContractViolation) -> ! {
    // Heap is unusable here. Write through a locked stderr handle only.
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = out.write_all(b"tickbench: ");
    let _ = writeln!(out, "{}", violation);
    process::exit(Status::OutOfMemory.code())
}

/// Global allocator that forwards every request to the installed platform.
///
/// ```ignore
/// #[global_allocator]
/// static ALLOC: tickbench_core::RedirectAllocator = tickbench_core::RedirectAllocator;
/// ```
pub struct RedirectAllocator;

unsafe impl GlobalAlloc for RedirectAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        match try_alloc(layout, Location::caller()) {
            Ok(ptr) => ptr,
            Err(violation) => die(&violation),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // Frees that arrive after uninstall are dropped on the floor; the
        // owning platform reclaimed its heap wholesale when it left.
        if let Some(platform) = current() {
            platform.release(ptr, layout, Location::caller());
        }
    }
}
