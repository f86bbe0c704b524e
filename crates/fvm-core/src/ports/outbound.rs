//! Outbound (driven) ports of the freshness manager.
//!
//! These traits define the external collaborators the manager depends on:
//! static configuration, durable runtime attributes, and the cryptographic
//! service that actually computes MACs.

use fvm_types::{FreshnessValue, FvmError, KeyId, SignalFreshnessConfig, SignalId};

/// Read-only access to static per-signal freshness configuration.
///
/// Loaded once at construction; `truncated_bits` and `sync_window` are
/// immutable for the process lifetime.
pub trait ConfigAccessor: Send + Sync {
    /// Configuration for one signal, or `None` if unconfigured.
    fn signal_config(&self, signal_id: SignalId) -> Option<SignalFreshnessConfig>;

    /// All configured signal ids.
    fn signal_ids(&self) -> Vec<SignalId>;

    /// Token authorizing administrative resets.
    fn reset_token(&self) -> &[u8];
}

/// Durable storage for counter snapshots.
///
/// Write-through contract: `persist_value` must confirm the write before the
/// manager commits and hands the value to the caller. A restart resumes from
/// the persisted value; resetting to 0 after a crash would let a replayed
/// old message be re-accepted.
pub trait RuntimeAttributesStore: Send + Sync {
    /// Last persisted counter value for a signal, if any.
    fn load_value(&self, signal_id: SignalId) -> Result<Option<FreshnessValue>, FvmError>;

    /// Persists a counter value. Called on every issuance and every
    /// acceptance.
    fn persist_value(&self, signal_id: SignalId, value: FreshnessValue) -> Result<(), FvmError>;
}

/// Boundary toward the cryptographic service.
///
/// The manager consumes this only to verify at construction time that every
/// configured key exists. Callers use it to bind issued/reconstructed
/// freshness values into MACs; the manager exposes no MAC interface itself.
pub trait CryptoServiceAccessor: Send + Sync {
    /// Whether the key is provisioned.
    fn key_exists(&self, key_id: KeyId) -> bool;

    /// Computes a MAC over `data` with the given key.
    fn mac_create(&self, key_id: KeyId, data: &[u8]) -> Result<Vec<u8>, FvmError>;

    /// Verifies a MAC over `data` with the given key.
    fn mac_verify(&self, key_id: KeyId, data: &[u8], mac: &[u8]) -> Result<bool, FvmError>;

    /// Cryptographically secure random bytes (challenges, test vectors).
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, FvmError>;
}
