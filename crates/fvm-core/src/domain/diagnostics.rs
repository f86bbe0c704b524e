//! Manager-wide diagnostics counters.
//!
//! Relaxed atomics: the counters are monotone tallies read by operators, not
//! synchronization points.

use std::sync::atomic::{AtomicU64, Ordering};

use fvm_types::ManagerDiagnostics;

/// Tallies of manager activity since start.
#[derive(Debug, Default)]
pub struct DiagnosticsCounters {
    issued: AtomicU64,
    accepted: AtomicU64,
    rejected_stale: AtomicU64,
    rejected_out_of_window: AtomicU64,
    overflows: AtomicU64,
    resets: AtomicU64,
}

impl DiagnosticsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_issued(&self) {
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_stale(&self) {
        self.rejected_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_out_of_window(&self) {
        self.rejected_out_of_window.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_overflow(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot for status reporting.
    pub fn snapshot(&self) -> ManagerDiagnostics {
        ManagerDiagnostics {
            issued: self.issued.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_stale: self.rejected_stale.load(Ordering::Relaxed),
            rejected_out_of_window: self.rejected_out_of_window.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}
