//! Keyed HMAC-SHA256 crypto accessor.
//!
//! Stands in for the platform crypto service in demos and tests. A real
//! deployment binds this port to the vehicle's crypto stack; the manager
//! only ever asks it whether keys exist.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use fvm_types::{FvmError, KeyId};

use crate::ports::outbound::CryptoServiceAccessor;

type HmacSha256 = Hmac<Sha256>;

/// Crypto accessor over a static table of symmetric keys.
#[derive(Debug, Clone, Default)]
pub struct HmacCryptoAccessor {
    keys: HashMap<KeyId, Vec<u8>>,
}

impl HmacCryptoAccessor {
    /// Creates an accessor over the given key table.
    pub fn new(keys: HashMap<KeyId, Vec<u8>>) -> Self {
        Self { keys }
    }

    /// Adds one key. Convenience for test setup.
    #[must_use]
    pub fn with_key(mut self, key_id: KeyId, key: Vec<u8>) -> Self {
        self.keys.insert(key_id, key);
        self
    }

    fn key(&self, key_id: KeyId) -> Result<&[u8], FvmError> {
        self.keys
            .get(&key_id)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                FvmError::ConfigurationInconsistent(format!("key {} not provisioned", key_id.0))
            })
    }
}

impl CryptoServiceAccessor for HmacCryptoAccessor {
    fn key_exists(&self, key_id: KeyId) -> bool {
        self.keys.contains_key(&key_id)
    }

    fn mac_create(&self, key_id: KeyId, data: &[u8]) -> Result<Vec<u8>, FvmError> {
        let mut mac = HmacSha256::new_from_slice(self.key(key_id)?)
            .map_err(|e| FvmError::ConfigurationInconsistent(format!("bad key material: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn mac_verify(&self, key_id: KeyId, data: &[u8], expected: &[u8]) -> Result<bool, FvmError> {
        let mut mac = HmacSha256::new_from_slice(self.key(key_id)?)
            .map_err(|e| FvmError::ConfigurationInconsistent(format!("bad key material: {e}")))?;
        mac.update(data);
        Ok(mac.verify_slice(expected).is_ok())
    }

    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, FvmError> {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        Ok(bytes)
    }
}
