//! Volatile runtime attributes store.
//!
//! Satisfies the write-through contract without durability. Used by tests
//! and demos; production deployments use `FileSnapshotStore`.

use std::collections::HashMap;

use parking_lot::RwLock;

use fvm_types::{FreshnessValue, FvmError, SignalId};

use crate::ports::outbound::RuntimeAttributesStore;

/// In-memory attribute store.
#[derive(Debug, Default)]
pub struct InMemoryAttributesStore {
    values: RwLock<HashMap<SignalId, FreshnessValue>>,
}

impl InMemoryAttributesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a persisted value, simulating state left by a previous run.
    pub fn seed(&self, signal_id: SignalId, value: FreshnessValue) {
        self.values.write().insert(signal_id, value);
    }
}

impl RuntimeAttributesStore for InMemoryAttributesStore {
    fn load_value(&self, signal_id: SignalId) -> Result<Option<FreshnessValue>, FvmError> {
        Ok(self.values.read().get(&signal_id).copied())
    }

    fn persist_value(&self, signal_id: SignalId, value: FreshnessValue) -> Result<(), FvmError> {
        self.values.write().insert(signal_id, value);
        Ok(())
    }
}
