//! # Centralized Envelope Security
//!
//! Single authoritative implementation of envelope validation for the FVM
//! server boundary: HMAC-SHA256 signatures, time-bounded nonce replay
//! prevention, and timestamp window checks. The server and every client use
//! this module so security policy lives in exactly one place.

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::entities::ClientId;
use crate::envelope::{AuthenticatedMessage, VerificationResult};

type HmacSha256 = Hmac<Sha256>;

/// Duration to retain nonces in cache (2x the validity window).
pub const NONCE_CACHE_TTL: Duration = Duration::from_secs(120);

/// Maximum nonce cache size before forced cleanup.
pub const MAX_NONCE_CACHE_SIZE: usize = 100_000;

// =============================================================================
// NONCE CACHE
// =============================================================================

/// Thread-safe nonce cache for replay prevention.
///
/// Tracks seen nonces with their expiry instants, evicting expired entries
/// when the cache grows past its bound.
#[derive(Debug, Default)]
pub struct NonceCache {
    cache: RwLock<HashMap<Uuid, Instant>>,
}

impl NonceCache {
    /// Creates a new empty nonce cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a nonce cache wrapped in Arc for shared ownership.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Checks if a nonce has been seen before; if not, inserts it.
    ///
    /// Returns `true` if the nonce is fresh, `false` on replay.
    pub fn check_and_insert(&self, nonce: Uuid) -> bool {
        let now = Instant::now();
        let expiry = now + NONCE_CACHE_TTL;

        // A poisoned lock still holds consistent data; recover rather than
        // refuse all traffic.
        let mut cache = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if cache.len() >= MAX_NONCE_CACHE_SIZE {
            cache.retain(|_, exp| *exp > now);
        }

        if let Some(&exp) = cache.get(&nonce) {
            if exp > now {
                return false;
            }
        }

        cache.insert(nonce, expiry);
        true
    }

    /// Returns the current number of cached nonces.
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// HMAC SIGNING
// =============================================================================

/// Serializes a message with its signature field zeroed, producing the bytes
/// both signing and verification operate on.
pub fn signable_bytes<T: Serialize + Clone>(
    message: &AuthenticatedMessage<T>,
) -> Result<Vec<u8>, bincode::Error> {
    let mut unsigned = message.clone();
    unsigned.signature = [0u8; 64];
    bincode::serialize(&unsigned)
}

/// Computes the 64-byte signature field: HMAC-SHA256 in the first 32 bytes,
/// zeros in the rest.
pub fn sign_bytes(message_bytes: &[u8], shared_secret: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha256::new_from_slice(shared_secret).expect("HMAC accepts any key length");
    mac.update(message_bytes);
    let hmac_bytes = mac.finalize().into_bytes();

    let mut signature = [0u8; 64];
    signature[..32].copy_from_slice(&hmac_bytes);
    signature
}

/// Verifies the HMAC in a 64-byte signature field. Constant-time.
pub fn verify_bytes(message_bytes: &[u8], signature: &[u8; 64], shared_secret: &[u8]) -> bool {
    let mut mac = match HmacSha256::new_from_slice(shared_secret) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(message_bytes);
    mac.verify_slice(&signature[..32]).is_ok()
}

/// Signs an envelope in place, filling its `signature` field.
pub fn sign_message<T: Serialize + Clone>(
    message: &mut AuthenticatedMessage<T>,
    shared_secret: &[u8],
) -> Result<(), bincode::Error> {
    let bytes = signable_bytes(message)?;
    message.signature = sign_bytes(&bytes, shared_secret);
    Ok(())
}

// =============================================================================
// TIMESTAMP VALIDATION
// =============================================================================

/// Validates that a message timestamp falls inside the acceptance window
/// `now - MAX_AGE ..= now + MAX_FUTURE_SKEW`.
pub fn validate_timestamp(timestamp: u64) -> Result<(), VerificationResult> {
    let now = current_timestamp();

    if timestamp + AuthenticatedMessage::<()>::MAX_AGE < now {
        return Err(VerificationResult::TimestampOutOfRange { timestamp, now });
    }
    if timestamp > now + AuthenticatedMessage::<()>::MAX_FUTURE_SKEW {
        return Err(VerificationResult::TimestampOutOfRange { timestamp, now });
    }
    Ok(())
}

/// Current Unix timestamp in seconds. Returns 0 if the clock reads before
/// the epoch rather than panicking.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// ENVELOPE VERIFIER
// =============================================================================

/// Provider of per-client shared secrets for envelope HMACs.
pub trait KeyProvider: Send + Sync {
    /// Returns the shared secret for a client, or `None` if the client is
    /// unknown (the message is rejected).
    fn client_secret(&self, client_id: ClientId) -> Option<Vec<u8>>;
}

/// Static table of client secrets loaded from configuration.
#[derive(Clone, Default)]
pub struct StaticKeyProvider {
    secrets: HashMap<ClientId, Vec<u8>>,
}

impl StaticKeyProvider {
    /// Builds a provider from configured `(client, secret)` pairs.
    pub fn new(secrets: HashMap<ClientId, Vec<u8>>) -> Self {
        Self { secrets }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn client_secret(&self, client_id: ClientId) -> Option<Vec<u8>> {
        self.secrets.get(&client_id).cloned()
    }
}

/// Single entry point for envelope validation at the server boundary.
///
/// Verification order: version, timestamp, nonce, signature. The nonce is
/// consumed before the signature check so a replayed frame is rejected even
/// if an attacker later learns the key.
pub struct EnvelopeVerifier<K: KeyProvider> {
    nonce_cache: Arc<NonceCache>,
    key_provider: K,
}

impl<K: KeyProvider> EnvelopeVerifier<K> {
    /// Creates a new verifier sharing the given nonce cache.
    pub fn new(nonce_cache: Arc<NonceCache>, key_provider: K) -> Self {
        Self {
            nonce_cache,
            key_provider,
        }
    }

    /// Runs all envelope checks against a deserialized message.
    pub fn verify<T: Serialize + Clone>(
        &self,
        message: &AuthenticatedMessage<T>,
    ) -> VerificationResult {
        if message.version != AuthenticatedMessage::<T>::CURRENT_VERSION {
            return VerificationResult::UnsupportedVersion {
                received: message.version,
                supported: AuthenticatedMessage::<T>::CURRENT_VERSION,
            };
        }

        if let Err(e) = validate_timestamp(message.timestamp) {
            return e;
        }

        if !self.nonce_cache.check_and_insert(message.nonce) {
            return VerificationResult::ReplayDetected {
                nonce: message.nonce,
            };
        }

        let secret = match self.key_provider.client_secret(message.client_id) {
            Some(s) => s,
            None => return VerificationResult::InvalidSignature,
        };

        let bytes = match signable_bytes(message) {
            Ok(b) => b,
            Err(_) => return VerificationResult::InvalidSignature,
        };

        if !verify_bytes(&bytes, &message.signature, &secret) {
            return VerificationResult::InvalidSignature;
        }

        VerificationResult::Valid
    }
}
