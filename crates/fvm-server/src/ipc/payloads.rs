//! Request/response payloads carried inside the authenticated envelope.
//!
//! Payloads carry no identity fields; the envelope's `client_id` is the sole
//! source of truth for who is asking.

use serde::{Deserialize, Serialize};

use fvm_types::{
    FreshnessValue, FvmError, IssuedFreshness, ManagerDiagnostics, SignalId, SignalStatus,
    Verdict,
};

/// Operations an application process can request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FvmRequest {
    /// Issue the next freshness value for a Transmit-role signal.
    Issue { signal_id: SignalId },
    /// Validate a received truncated freshness value.
    Validate { signal_id: SignalId, truncated: u64 },
    /// Administrative resynchronization to a trusted full value.
    Reset {
        signal_id: SignalId,
        new_value: FreshnessValue,
        authorization: Vec<u8>,
    },
    /// Read-only counter status for one signal.
    Status { signal_id: SignalId },
    /// Manager-wide activity counters.
    Diagnostics,
}

/// Server replies, one variant per request kind. Manager errors travel as
/// values so the caller gets the full taxonomy, not a stringly-typed copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FvmResponse {
    Issued(Result<IssuedFreshness, FvmError>),
    Validated(Result<Verdict, FvmError>),
    ResetDone(Result<(), FvmError>),
    Status(Result<SignalStatus, FvmError>),
    Diagnostics(ManagerDiagnostics),
}
