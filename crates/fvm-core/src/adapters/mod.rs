//! Adapters implementing the outbound ports.
//!
//! - `static_config` - in-memory configuration table
//! - `memory_store` - volatile attribute store for tests and demos
//! - `snapshot_store` - file-backed attribute store with an exclusive lock
//! - `demo_crypto` - keyed HMAC-SHA256 crypto accessor

pub mod demo_crypto;
pub mod memory_store;
pub mod snapshot_store;
pub mod static_config;

pub use demo_crypto::HmacCryptoAccessor;
pub use memory_store::InMemoryAttributesStore;
pub use snapshot_store::FileSnapshotStore;
pub use static_config::StaticConfigAccessor;
