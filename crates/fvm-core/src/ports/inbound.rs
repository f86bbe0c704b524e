//! # Inbound Port - FreshnessApi
//!
//! Primary driving port exposing the freshness authority. Used directly by
//! in-process callers and wrapped by `fvm-server` for cross-process ones.

use fvm_types::{
    FreshnessValue, FvmError, IssuedFreshness, ManagerDiagnostics, SignalId, SignalStatus,
    Verdict,
};

/// Primary API of the Freshness Value Manager.
///
/// All operations are computational and bounded; the only blocking is the
/// per-signal mutex and the write-through to the runtime attributes store.
/// None of these operations are idempotent except repeated `validate` calls
/// with already-rejected values.
pub trait FreshnessApi: Send + Sync {
    /// Issues the next freshness value for a Transmit-role signal.
    ///
    /// The returned value is strictly `last_issued + 1`; the new value is
    /// persisted before it is handed out, so a crash can never cause a
    /// reissue.
    ///
    /// # Errors
    /// - `UnknownSignal`: id not configured
    /// - `RoleMismatch`: signal is Receive-role
    /// - `Overflow`: counter exhausted; never wraps silently
    /// - `PersistenceFailure`: storage did not confirm the write
    fn get_freshness_for_transmit(
        &self,
        signal_id: SignalId,
    ) -> Result<IssuedFreshness, FvmError>;

    /// Validates a received truncated freshness value for a Receive-role
    /// signal.
    ///
    /// An `Accepted` verdict carries the reconstructed full value for the
    /// caller to forward to the crypto service; the manager itself never
    /// touches message bytes or keys.
    ///
    /// # Errors
    /// - `UnknownSignal`, `RoleMismatch`
    /// - `TruncationMismatch`: input has bits set above the configured `T`
    /// - `PersistenceFailure`: an acceptance could not be persisted
    fn verify_freshness_on_receive(
        &self,
        signal_id: SignalId,
        truncated: u64,
    ) -> Result<Verdict, FvmError>;

    /// Administrative resynchronization to a trusted full value, e.g. after
    /// a secure provisioning event. The only sanctioned way to set a counter
    /// outside the normal increment/accept flow.
    ///
    /// # Errors
    /// - `Unauthorized`: token mismatch
    /// - `Overflow`: value exceeds the W-bit range
    /// - `UnknownSignal`, `PersistenceFailure`
    fn reset_signal(
        &self,
        signal_id: SignalId,
        new_value: FreshnessValue,
        authorization: &[u8],
    ) -> Result<(), FvmError>;

    /// Read-only snapshot of one signal's counter state.
    fn sync_status(&self, signal_id: SignalId) -> Result<SignalStatus, FvmError>;

    /// Manager-wide activity counters.
    fn diagnostics(&self) -> ManagerDiagnostics;
}
