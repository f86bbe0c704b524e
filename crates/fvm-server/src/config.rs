//! Server configuration file (JSON).
//!
//! One file carries everything the binary needs: socket and snapshot paths,
//! per-client envelope secrets, crypto key material for the demo accessor,
//! the reset authorization token, and the signal table. Secrets and keys are
//! hex-encoded strings in the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fvm_types::{ClientId, KeyId, SignalFreshnessConfig, SignalId, SignalRole};

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Unix-domain socket the server listens on.
    pub socket_path: PathBuf,
    /// Counter snapshot file (exclusively locked by the running server).
    pub snapshot_path: PathBuf,
    /// Hex-encoded token authorizing administrative resets.
    pub reset_token: String,
    /// Application processes allowed to connect.
    pub clients: Vec<ClientEntry>,
    /// Keys provisioned into the crypto accessor.
    pub keys: Vec<KeyEntry>,
    /// The signal table.
    pub signals: Vec<SignalEntry>,
}

/// One authorized client and its envelope HMAC secret (hex).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEntry {
    pub id: u16,
    pub secret: String,
}

/// One crypto key and its material (hex).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEntry {
    pub id: u16,
    pub material: String,
}

/// One configured signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEntry {
    pub id: u32,
    pub role: SignalRole,
    pub counter_bits: u8,
    pub truncated_bits: u8,
    pub sync_window: u64,
    pub key_id: u16,
}

impl ServerConfig {
    /// Loads and structurally validates a configuration file. Per-signal
    /// bit-width checks are the factory's job; this only rejects what would
    /// make the server itself unsound.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let bytes = std::fs::read(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        let config: Self =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path_str,
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.signals.is_empty() {
            return Err(ConfigError::Invalid("no signals configured".into()));
        }
        if self.clients.is_empty() {
            return Err(ConfigError::Invalid("no clients configured".into()));
        }
        // Client id 0 is the server's own sender id in response envelopes.
        if self.clients.iter().any(|c| c.id == 0) {
            return Err(ConfigError::Invalid(
                "client id 0 is reserved for the server".into(),
            ));
        }
        Ok(())
    }

    /// Signal table in the shape the config accessor wants.
    pub fn signal_table(&self) -> HashMap<SignalId, SignalFreshnessConfig> {
        self.signals
            .iter()
            .map(|s| {
                (
                    SignalId(s.id),
                    SignalFreshnessConfig {
                        role: s.role,
                        counter_bits: s.counter_bits,
                        truncated_bits: s.truncated_bits,
                        sync_window: s.sync_window,
                        key_id: KeyId(s.key_id),
                    },
                )
            })
            .collect()
    }

    /// Decoded per-client envelope secrets.
    pub fn client_secrets(&self) -> Result<HashMap<ClientId, Vec<u8>>, ConfigError> {
        self.clients
            .iter()
            .map(|c| {
                let secret = hex::decode(&c.secret).map_err(|e| {
                    ConfigError::Invalid(format!("client {} secret is not hex: {e}", c.id))
                })?;
                Ok((ClientId(c.id), secret))
            })
            .collect()
    }

    /// Decoded crypto key material.
    pub fn key_table(&self) -> Result<HashMap<KeyId, Vec<u8>>, ConfigError> {
        self.keys
            .iter()
            .map(|k| {
                let material = hex::decode(&k.material).map_err(|e| {
                    ConfigError::Invalid(format!("key {} material is not hex: {e}", k.id))
                })?;
                Ok((KeyId(k.id), material))
            })
            .collect()
    }

    /// Decoded reset authorization token.
    pub fn reset_token_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        hex::decode(&self.reset_token)
            .map_err(|e| ConfigError::Invalid(format!("reset_token is not hex: {e}")))
    }
}
