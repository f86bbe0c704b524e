//! # FVM Shared Types
//!
//! Single Source of Truth for type definitions shared across the freshness
//! manager core, the IPC server boundary, and the operator tooling.
//!
//! ## Contents
//!
//! - `entities` - Signal identifiers, roles, per-signal freshness configuration,
//!   verdicts, and diagnostics snapshots
//! - `errors` - The public `FvmError` taxonomy (crosses the wire intact)
//! - `envelope` - The `AuthenticatedMessage<T>` wrapper for all IPC traffic
//! - `security` - HMAC signing/verification, nonce replay cache, timestamp
//!   window validation

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod security;

pub use entities::{
    ClientId, FreshnessValue, IssuedFreshness, KeyId, ManagerDiagnostics, RejectReason, SignalId,
    SignalFreshnessConfig, SignalRole, SignalStatus, SyncState, Verdict,
};
pub use envelope::{AuthenticatedMessage, VerificationResult};
pub use errors::FvmError;
