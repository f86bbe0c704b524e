//! Ports layer: inbound (driving) and outbound (driven) interfaces.

pub mod inbound;
pub mod outbound;

pub use inbound::FreshnessApi;
pub use outbound::{ConfigAccessor, CryptoServiceAccessor, RuntimeAttributesStore};
