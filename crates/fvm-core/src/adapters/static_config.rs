//! Static in-memory configuration table.

use std::collections::HashMap;

use fvm_types::{SignalFreshnessConfig, SignalId};

use crate::ports::outbound::ConfigAccessor;

/// Configuration accessor backed by a fixed table, built once at startup
/// (tests construct it directly; the server binary fills it from JSON).
#[derive(Debug, Clone, Default)]
pub struct StaticConfigAccessor {
    signals: HashMap<SignalId, SignalFreshnessConfig>,
    reset_token: Vec<u8>,
}

impl StaticConfigAccessor {
    /// Creates an accessor over the given signal table and reset token.
    pub fn new(signals: HashMap<SignalId, SignalFreshnessConfig>, reset_token: Vec<u8>) -> Self {
        Self {
            signals,
            reset_token,
        }
    }

    /// Adds one signal entry. Convenience for test setup.
    #[must_use]
    pub fn with_signal(mut self, id: SignalId, config: SignalFreshnessConfig) -> Self {
        self.signals.insert(id, config);
        self
    }
}

impl ConfigAccessor for StaticConfigAccessor {
    fn signal_config(&self, signal_id: SignalId) -> Option<SignalFreshnessConfig> {
        self.signals.get(&signal_id).copied()
    }

    fn signal_ids(&self) -> Vec<SignalId> {
        self.signals.keys().copied().collect()
    }

    fn reset_token(&self) -> &[u8] {
        &self.reset_token
    }
}
