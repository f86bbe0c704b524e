//! Cross-crate integration tests.

pub mod concurrency;
pub mod freshness_flows;
pub mod server_roundtrip;

use std::collections::HashMap;
use std::sync::Arc;

use fvm_core::adapters::demo_crypto::HmacCryptoAccessor;
use fvm_core::adapters::memory_store::InMemoryAttributesStore;
use fvm_core::adapters::static_config::StaticConfigAccessor;
use fvm_core::{FreshnessValueManager, FvmFactory};
use fvm_types::{KeyId, SignalFreshnessConfig, SignalId, SignalRole};

pub const RESET_TOKEN: &[u8] = b"integration_reset_token";

pub fn signal_config(role: SignalRole) -> SignalFreshnessConfig {
    SignalFreshnessConfig {
        role,
        counter_bits: 32,
        truncated_bits: 8,
        sync_window: 16,
        key_id: KeyId(1),
    }
}

/// Manager over an in-memory store, with optional pre-seeded counters.
pub fn build_manager(
    signals: &[(SignalId, SignalFreshnessConfig)],
    seeded: &[(SignalId, u64)],
) -> Arc<FreshnessValueManager> {
    let mut table = StaticConfigAccessor::new(HashMap::new(), RESET_TOKEN.to_vec());
    for (id, cfg) in signals {
        table = table.with_signal(*id, *cfg);
    }
    let store = Arc::new(InMemoryAttributesStore::new());
    for (id, value) in seeded {
        store.seed(*id, *value);
    }
    let crypto =
        Arc::new(HmacCryptoAccessor::default().with_key(KeyId(1), b"integration_key".to_vec()));
    Arc::new(FvmFactory::assemble(Arc::new(table), store, crypto).expect("manager assembles"))
}
