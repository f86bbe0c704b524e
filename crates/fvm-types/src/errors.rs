//! The public FVM error taxonomy.
//!
//! Every operation returns a typed result; the manager never terminates the
//! process and never silently drops a request. The enum is serde-derived so
//! it crosses the IPC boundary intact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{SignalId, SignalRole};

/// Error taxonomy of the Freshness Value Manager.
///
/// Stale and out-of-window receptions are not errors: a well-formed
/// validation always succeeds and reports its outcome as a
/// [`Verdict::Rejected`](crate::entities::Verdict) with the reject reason.
/// Errors are reserved for requests the manager could not evaluate at all.
///
/// None of these are retried automatically inside the core; retry policy
/// belongs to the caller or the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FvmError {
    /// The signal id is not present in the loaded configuration.
    #[error("{0} is not configured")]
    UnknownSignal(SignalId),

    /// The operation requires the opposite role (issue on Receive,
    /// validate on Transmit).
    #[error("{signal_id} is configured as {actual}, operation requires {expected}")]
    RoleMismatch {
        signal_id: SignalId,
        expected: SignalRole,
        actual: SignalRole,
    },

    /// Incrementing (or resetting) would exceed the configured W-bit range.
    /// The counter never wraps silently; remediation (rekeying, session
    /// re-establishment) happens above this component.
    #[error("{signal_id} counter exhausted at {limit} ({counter_bits}-bit)")]
    Overflow {
        signal_id: SignalId,
        counter_bits: u8,
        limit: u64,
    },

    /// The truncated input has bits set above the configured `T`.
    #[error("{signal_id}: truncated value {value} does not fit {truncated_bits} bits")]
    TruncationMismatch {
        signal_id: SignalId,
        value: u64,
        truncated_bits: u8,
    },

    /// Administrative operation without a valid authorization token.
    #[error("administrative operation rejected: invalid authorization token")]
    Unauthorized,

    /// The runtime attributes store failed to confirm a write. The counter
    /// state was not advanced; the value will be re-offered once storage
    /// recovers.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// Construction-time validation failure. Fatal: the manager refuses to
    /// start.
    #[error("configuration inconsistent: {0}")]
    ConfigurationInconsistent(String),
}
