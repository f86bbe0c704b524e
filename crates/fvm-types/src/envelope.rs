//! # `AuthenticatedMessage` Envelope
//!
//! The universal wrapper for all traffic crossing the FVM server boundary.
//!
//! ## Security Properties
//!
//! - **Versioning**: every message carries a `version` field checked before
//!   processing.
//! - **Correlation**: request/response pairs share a `correlation_id`.
//! - **Time-Bounded Replay Prevention**: nonces are only valid within the
//!   timestamp window.
//! - **Envelope Authority**: `client_id` is the sole source of truth for the
//!   caller's identity; payloads carry no identity fields.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use uuid::Uuid;

use crate::entities::ClientId;

/// Authenticated wrapper around every request and response payload.
///
/// The freshness authority exists to keep replays off the vehicle network;
/// it must itself be reachable only through a replay-protected channel.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedMessage<T> {
    /// Protocol version, checked by deserializers before processing.
    pub version: u16,

    /// The sending application process. Sole source of truth for identity.
    pub client_id: ClientId,

    /// Correlates a response with its request. Requests generate a fresh
    /// UUID; responses echo it.
    pub correlation_id: Uuid,

    /// Unix timestamp (seconds) when the message was created.
    /// Valid window: `now - MAX_AGE <= timestamp <= now + MAX_FUTURE_SKEW`.
    pub timestamp: u64,

    /// Unique nonce for replay prevention within the timestamp window.
    pub nonce: Uuid,

    /// HMAC-SHA256 over the serialized message with this field zeroed.
    /// The MAC occupies the first 32 bytes; the rest are zero.
    #[serde_as(as = "Bytes")]
    pub signature: [u8; 64],

    /// The actual request or response payload.
    pub payload: T,
}

impl<T> AuthenticatedMessage<T> {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Maximum allowed clock skew for future timestamps (seconds).
    pub const MAX_FUTURE_SKEW: u64 = 10;

    /// Maximum age for valid timestamps (seconds).
    pub const MAX_AGE: u64 = 60;
}

/// Result of envelope verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// Message passed all checks.
    Valid,
    /// Message version is unsupported.
    UnsupportedVersion { received: u16, supported: u16 },
    /// Message timestamp is outside the valid window.
    TimestampOutOfRange { timestamp: u64, now: u64 },
    /// Message nonce has been seen before (replay).
    ReplayDetected { nonce: Uuid },
    /// Unknown client or bad HMAC.
    InvalidSignature,
}

impl VerificationResult {
    /// Returns true if verification succeeded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }
}
