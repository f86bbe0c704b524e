//! Core freshness vocabulary.
//!
//! These types are deliberately plain data: all counter arithmetic and state
//! transitions live in `fvm-core`, all wire handling in `fvm-server`.

use serde::{Deserialize, Serialize};

use crate::errors::FvmError;

/// A full freshness counter value. The configured bit-width `W` of a signal
/// restricts which values are representable; the type is always `u64`.
pub type FreshnessValue = u64;

/// Opaque, configuration-defined key identifying one authenticated signal.
///
/// Unique within one manager instance. Never reused for a different logical
/// signal without a configuration change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SignalId(pub u32);

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "signal:{}", self.0)
    }
}

/// Identifier of a key known to the crypto service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(pub u16);

/// Identifier of an application process allowed to talk to the FVM server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u16);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client:{}", self.0)
    }
}

/// Direction a signal is configured for. Exclusive per manager instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalRole {
    /// This instance issues freshness values for the signal.
    Transmit,
    /// This instance reconstructs and accepts freshness values for the signal.
    Receive,
}

impl std::fmt::Display for SignalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalRole::Transmit => write!(f, "transmit"),
            SignalRole::Receive => write!(f, "receive"),
        }
    }
}

/// Receive-side synchronization state.
///
/// Transmit-role counters have no sync state; they are always authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// No prior accepted value exists; the next value bootstraps the counter.
    Unsynchronized,
    /// Normal validation applies.
    Synchronized,
    /// Drift exceeded the synchronization window. Only an authorized reset
    /// recovers from this state.
    OutOfWindow,
}

/// Static per-signal freshness configuration, immutable after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFreshnessConfig {
    /// Transmit or Receive for this manager instance.
    pub role: SignalRole,
    /// Bit-width `W` of the full counter (1..=64).
    pub counter_bits: u8,
    /// Number of low-order bits `T` carried on the wire (1..=W).
    pub truncated_bits: u8,
    /// Maximum forward distance, in counter steps, accepted without
    /// resynchronization. Must satisfy `1 <= sync_window < 2^T`.
    pub sync_window: u64,
    /// Key the crypto service binds this signal's freshness values with.
    pub key_id: KeyId,
}

impl SignalFreshnessConfig {
    /// Largest representable counter value, `2^W - 1`.
    #[must_use]
    pub fn max_value(&self) -> FreshnessValue {
        if self.counter_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.counter_bits) - 1
        }
    }

    /// Number of distinct truncated values, `2^T`. Saturates at `u64::MAX`
    /// for `T == 64` (the only case where the modulus itself overflows).
    #[must_use]
    pub fn truncation_modulus(&self) -> u64 {
        if self.truncated_bits >= 64 {
            u64::MAX
        } else {
            1u64 << self.truncated_bits
        }
    }

    /// Low `T` bits of a full value, the form carried on the wire.
    #[must_use]
    pub fn truncate(&self, value: FreshnessValue) -> u64 {
        if self.truncated_bits >= 64 {
            value
        } else {
            value & (self.truncation_modulus() - 1)
        }
    }

    /// Construction-time consistency check.
    ///
    /// # Errors
    /// `ConfigurationInconsistent` naming the violated constraint.
    pub fn validate(&self, id: SignalId) -> Result<(), FvmError> {
        if self.counter_bits == 0 || self.counter_bits > 64 {
            return Err(FvmError::ConfigurationInconsistent(format!(
                "{id}: counter_bits {} outside 1..=64",
                self.counter_bits
            )));
        }
        if self.truncated_bits == 0 || self.truncated_bits > self.counter_bits {
            return Err(FvmError::ConfigurationInconsistent(format!(
                "{id}: truncated_bits {} outside 1..=counter_bits ({})",
                self.truncated_bits, self.counter_bits
            )));
        }
        // A window reaching a full truncated cycle would make replays
        // indistinguishable from fresh values.
        if self.sync_window == 0 || self.sync_window >= self.truncation_modulus() {
            return Err(FvmError::ConfigurationInconsistent(format!(
                "{id}: sync_window {} outside 1..2^{}",
                self.sync_window, self.truncated_bits
            )));
        }
        Ok(())
    }
}

/// Result of a successful transmit-side issuance.
///
/// Carries both forms because the crypto binding needs the full value while
/// the wire carries only the truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedFreshness {
    /// The authoritative counter value bound into the MAC.
    pub full_value: FreshnessValue,
    /// The low `T` bits actually transmitted.
    pub truncated: u64,
}

/// Why a receive-side validation rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The reconstruction is not newer than the last accepted value
    /// (ordinary staleness or replay). The counter stays `Synchronized`.
    Stale,
    /// No candidate within the synchronization window exceeds the last
    /// accepted value. The counter stops accepting until an authorized reset.
    OutOfWindow,
}

/// Receive-side validation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The value is newer; `full_value` is the reconstruction to forward to
    /// the crypto service for MAC verification.
    Accepted { full_value: FreshnessValue },
    /// The value was rejected. Rejections are verdicts, not errors: the
    /// request itself was well-formed.
    Rejected { reason: RejectReason },
}

impl Verdict {
    /// Returns true if the verdict is `Accepted`.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Read-only snapshot of one signal's counter state, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStatus {
    pub signal_id: SignalId,
    pub role: SignalRole,
    /// `None` for Transmit-role counters.
    pub sync_state: Option<SyncState>,
    /// `last_issued` (Transmit) or `last_accepted` (Receive); `None` until
    /// the first issuance/acceptance.
    pub last_value: Option<FreshnessValue>,
}

/// Manager-wide diagnostics counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerDiagnostics {
    pub issued: u64,
    pub accepted: u64,
    pub rejected_stale: u64,
    pub rejected_out_of_window: u64,
    pub overflows: u64,
    pub resets: u64,
}
