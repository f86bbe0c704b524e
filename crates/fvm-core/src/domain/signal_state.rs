//! Per-signal freshness counter state machine.
//!
//! Methods come in plan/commit pairs: planners are pure and compute the
//! transition, the service persists the planned value, and only a confirmed
//! write is committed. A failed persistence therefore leaves the counter
//! exactly where it was, and the planned value is re-offered later.

use fvm_types::{
    FreshnessValue, FvmError, SignalFreshnessConfig, SignalId, SignalRole, SignalStatus,
    SyncState, Verdict,
};

use super::reconstruction::{reconstruct, Reconstruction};

/// Planned outcome of a receive-side validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPlan {
    /// Accept the reconstruction. Must be persisted before commit.
    Accept { full_value: FreshnessValue },
    /// Reject without touching state.
    RejectStale,
    /// Reject and transition the counter to `OutOfWindow`.
    RejectOutOfWindow,
    /// Already out of window; reject until an authorized reset.
    AlreadyOutOfWindow,
}

/// One freshness counter, the unit of locking and the unit of test.
#[derive(Debug, Clone)]
pub struct SignalCounterState {
    id: SignalId,
    config: SignalFreshnessConfig,
    /// `last_issued` (Transmit) or `last_accepted` (Receive).
    last_value: Option<FreshnessValue>,
    /// Receive-side only; Transmit counters are always authoritative.
    sync_state: SyncState,
}

impl SignalCounterState {
    /// Builds the counter from configuration and an optionally persisted
    /// last-known value. A Receive counter with a persisted value resumes
    /// `Synchronized`; without one it starts `Unsynchronized`.
    pub fn new(
        id: SignalId,
        config: SignalFreshnessConfig,
        persisted: Option<FreshnessValue>,
    ) -> Self {
        let sync_state = match (config.role, persisted) {
            (SignalRole::Receive, Some(_)) => SyncState::Synchronized,
            (SignalRole::Receive, None) => SyncState::Unsynchronized,
            // Unused for transmit; kept Synchronized for status reporting.
            (SignalRole::Transmit, _) => SyncState::Synchronized,
        };
        Self {
            id,
            config,
            last_value: persisted,
            sync_state,
        }
    }

    /// The signal's static configuration.
    pub fn config(&self) -> &SignalFreshnessConfig {
        &self.config
    }

    fn require_role(&self, expected: SignalRole) -> Result<(), FvmError> {
        if self.config.role != expected {
            return Err(FvmError::RoleMismatch {
                signal_id: self.id,
                expected,
                actual: self.config.role,
            });
        }
        Ok(())
    }

    fn check_truncation(&self, truncated: u64) -> Result<(), FvmError> {
        if self.config.truncated_bits < 64 && truncated >= self.config.truncation_modulus() {
            return Err(FvmError::TruncationMismatch {
                signal_id: self.id,
                value: truncated,
                truncated_bits: self.config.truncated_bits,
            });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Transmit side
    // -------------------------------------------------------------------------

    /// Plans the next issuance: `last_issued + 1`, or `Overflow` at the end
    /// of the W-bit range. Never mutates.
    pub fn plan_issue(&self) -> Result<FreshnessValue, FvmError> {
        self.require_role(SignalRole::Transmit)?;
        let last = self.last_value.unwrap_or(0);
        if last >= self.config.max_value() {
            return Err(FvmError::Overflow {
                signal_id: self.id,
                counter_bits: self.config.counter_bits,
                limit: self.config.max_value(),
            });
        }
        Ok(last + 1)
    }

    /// Commits an issuance after its persistence succeeded.
    pub fn commit_issue(&mut self, value: FreshnessValue) {
        self.last_value = Some(value);
    }

    // -------------------------------------------------------------------------
    // Receive side
    // -------------------------------------------------------------------------

    /// Plans the validation of a received truncated value. Never mutates.
    pub fn plan_validate(&self, truncated: u64) -> Result<ValidationPlan, FvmError> {
        self.require_role(SignalRole::Receive)?;
        self.check_truncation(truncated)?;

        match self.sync_state {
            SyncState::OutOfWindow => Ok(ValidationPlan::AlreadyOutOfWindow),
            SyncState::Unsynchronized => {
                // Bootstrap: no prior full value exists, the low bits are the
                // full value.
                Ok(ValidationPlan::Accept {
                    full_value: truncated,
                })
            }
            SyncState::Synchronized => {
                let last = self.last_value.unwrap_or(0);
                Ok(match reconstruct(last, truncated, &self.config) {
                    Reconstruction::InWindow(full_value) => ValidationPlan::Accept { full_value },
                    Reconstruction::Stale => ValidationPlan::RejectStale,
                    Reconstruction::OutOfWindow => ValidationPlan::RejectOutOfWindow,
                })
            }
        }
    }

    /// Commits an acceptance after its persistence succeeded.
    pub fn commit_accept(&mut self, value: FreshnessValue) {
        self.last_value = Some(value);
        self.sync_state = SyncState::Synchronized;
    }

    /// Records unrecoverable drift. No persistence involved: the last
    /// accepted value stays authoritative.
    pub fn commit_out_of_window(&mut self) {
        self.sync_state = SyncState::OutOfWindow;
    }

    // -------------------------------------------------------------------------
    // Administrative reset
    // -------------------------------------------------------------------------

    /// Plans an authorized reset to a trusted full value. Valid for both
    /// roles; the only sanctioned way to set the counter outside the normal
    /// increment/accept flow.
    pub fn plan_reset(&self, new_value: FreshnessValue) -> Result<(), FvmError> {
        if new_value > self.config.max_value() {
            return Err(FvmError::Overflow {
                signal_id: self.id,
                counter_bits: self.config.counter_bits,
                limit: self.config.max_value(),
            });
        }
        Ok(())
    }

    /// Commits a reset after its persistence succeeded. Returns a Receive
    /// counter to `Synchronized`.
    pub fn commit_reset(&mut self, new_value: FreshnessValue) {
        self.last_value = Some(new_value);
        self.sync_state = SyncState::Synchronized;
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    /// Read-only snapshot for diagnostics.
    pub fn status(&self) -> SignalStatus {
        SignalStatus {
            signal_id: self.id,
            role: self.config.role,
            sync_state: match self.config.role {
                SignalRole::Receive => Some(self.sync_state),
                SignalRole::Transmit => None,
            },
            last_value: self.last_value,
        }
    }

    /// Maps a validation plan to the verdict reported to callers.
    pub fn verdict_for(plan: &ValidationPlan) -> Verdict {
        match plan {
            ValidationPlan::Accept { full_value } => Verdict::Accepted {
                full_value: *full_value,
            },
            ValidationPlan::RejectStale => Verdict::Rejected {
                reason: fvm_types::RejectReason::Stale,
            },
            ValidationPlan::RejectOutOfWindow | ValidationPlan::AlreadyOutOfWindow => {
                Verdict::Rejected {
                    reason: fvm_types::RejectReason::OutOfWindow,
                }
            }
        }
    }
}
