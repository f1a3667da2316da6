//! Caller-controlled memory probe

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use super::ports::{MemoryProbe, ProbeError};

/// Probe whose reading is set by the caller.
///
/// Used by tests to drive the admission boundary and by hosts that track
/// their own memory budget. The probe can be switched into a failing state
/// to simulate an unreadable statistic source.
///
/// # Example
/// ```
/// use matcache_core::memory::{ManualProbe, MemoryProbe};
///
/// let probe = ManualProbe::new(4096);
/// assert_eq!(probe.free_memory(), Ok(4096));
/// probe.set_failing(true);
/// assert!(probe.free_memory().is_err());
/// ```
#[derive(Debug, Default)]
pub struct ManualProbe {
    free_bytes: AtomicU64,
    failing: AtomicBool,
    samples: AtomicUsize,
}

impl ManualProbe {
    /// Create a probe reporting `free_bytes`.
    pub fn new(free_bytes: u64) -> Self {
        Self {
            free_bytes: AtomicU64::new(free_bytes),
            failing: AtomicBool::new(false),
            samples: AtomicUsize::new(0),
        }
    }

    /// Change the reported free memory.
    pub fn set_free(&self, free_bytes: u64) {
        self.free_bytes.store(free_bytes, Ordering::SeqCst);
    }

    /// Make subsequent samples fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of samples taken so far, failed ones included.
    pub fn samples(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }
}

impl MemoryProbe for ManualProbe {
    fn free_memory(&self) -> Result<u64, ProbeError> {
        self.samples.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProbeError::Unavailable("manual probe set to fail".to_string()));
        }
        Ok(self.free_bytes.load(Ordering::SeqCst))
    }
}
