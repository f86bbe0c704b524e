//! The Freshness Value Manager: single entry point for all callers.
//!
//! Routes requests by signal id into the lock arena, enforces the
//! persist-before-commit ordering, keeps the diagnostics tallies, and maps
//! internal outcomes into the public taxonomy. Persistence happens while the
//! signal's mutex is held, so a value is never observable anywhere before
//! storage confirmed it.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, error, info, warn};

use fvm_types::{
    FreshnessValue, FvmError, IssuedFreshness, ManagerDiagnostics, RejectReason, SignalId,
    SignalStatus, Verdict,
};

use crate::domain::{DiagnosticsCounters, SignalArena, SignalCounterState, ValidationPlan};
use crate::ports::inbound::FreshnessApi;
use crate::ports::outbound::RuntimeAttributesStore;

/// The freshness authority. Construct via [`crate::factory::FvmFactory`].
pub struct FreshnessValueManager {
    arena: SignalArena,
    store: Arc<dyn RuntimeAttributesStore>,
    reset_token: Vec<u8>,
    diagnostics: DiagnosticsCounters,
}

impl FreshnessValueManager {
    pub(crate) fn new(
        arena: SignalArena,
        store: Arc<dyn RuntimeAttributesStore>,
        reset_token: Vec<u8>,
    ) -> Self {
        Self {
            arena,
            store,
            reset_token,
            diagnostics: DiagnosticsCounters::new(),
        }
    }

    /// All configured signal ids.
    pub fn signal_ids(&self) -> Vec<SignalId> {
        self.arena.signal_ids()
    }
}

impl FreshnessApi for FreshnessValueManager {
    fn get_freshness_for_transmit(
        &self,
        signal_id: SignalId,
    ) -> Result<IssuedFreshness, FvmError> {
        let result = self.arena.with_entry(signal_id, |state| {
            let next = state.plan_issue()?;
            // Write-through: the value is lost-proof before anyone sees it.
            self.store.persist_value(signal_id, next)?;
            state.commit_issue(next);
            Ok(IssuedFreshness {
                full_value: next,
                truncated: state.config().truncate(next),
            })
        })?;

        match &result {
            Ok(issued) => {
                self.diagnostics.record_issued();
                debug!(%signal_id, full_value = issued.full_value, "freshness issued");
            }
            Err(FvmError::Overflow { limit, .. }) => {
                // Overflow demands remediation (rekeying, session
                // re-establishment) above this component; it is never an
                // ordinary rejection.
                self.diagnostics.record_overflow();
                error!(%signal_id, limit, "freshness counter exhausted, issuance refused");
            }
            Err(e) => {
                warn!(%signal_id, error = %e, "issuance failed");
            }
        }
        result
    }

    fn verify_freshness_on_receive(
        &self,
        signal_id: SignalId,
        truncated: u64,
    ) -> Result<Verdict, FvmError> {
        let verdict = self.arena.with_entry(signal_id, |state| {
            let plan = state.plan_validate(truncated)?;
            if let ValidationPlan::Accept { full_value } = plan {
                self.store.persist_value(signal_id, full_value)?;
                state.commit_accept(full_value);
            }
            if let ValidationPlan::RejectOutOfWindow = plan {
                state.commit_out_of_window();
            }
            Ok(SignalCounterState::verdict_for(&plan))
        })??;

        match verdict {
            Verdict::Accepted { full_value } => {
                self.diagnostics.record_accepted();
                debug!(%signal_id, full_value, "freshness accepted");
            }
            Verdict::Rejected {
                reason: RejectReason::Stale,
            } => {
                self.diagnostics.record_rejected_stale();
                debug!(%signal_id, truncated, "stale freshness rejected");
            }
            Verdict::Rejected {
                reason: RejectReason::OutOfWindow,
            } => {
                self.diagnostics.record_rejected_out_of_window();
                warn!(
                    %signal_id,
                    truncated,
                    "freshness beyond synchronization window, resynchronization required"
                );
            }
        }
        Ok(verdict)
    }

    fn reset_signal(
        &self,
        signal_id: SignalId,
        new_value: FreshnessValue,
        authorization: &[u8],
    ) -> Result<(), FvmError> {
        if authorization.ct_eq(&self.reset_token).unwrap_u8() != 1 {
            warn!(%signal_id, "reset rejected: invalid authorization token");
            return Err(FvmError::Unauthorized);
        }

        // Takes the same per-signal lock as issue/validate: resets serialize
        // globally against normal traffic on this signal.
        self.arena.with_entry(signal_id, |state| {
            state.plan_reset(new_value)?;
            self.store.persist_value(signal_id, new_value)?;
            state.commit_reset(new_value);
            Ok(())
        })??;

        self.diagnostics.record_reset();
        info!(%signal_id, new_value, "counter reset by authorized caller");
        Ok(())
    }

    fn sync_status(&self, signal_id: SignalId) -> Result<SignalStatus, FvmError> {
        self.arena.with_entry(signal_id, |state| state.status())
    }

    fn diagnostics(&self) -> ManagerDiagnostics {
        self.diagnostics.snapshot()
    }
}
