//! # FVM Server
//!
//! IPC boundary of the Freshness Value Manager. Application processes reach
//! the in-process manager through a Unix-domain socket; every frame is an
//! [`fvm_types::AuthenticatedMessage`] verified before dispatch, so the
//! component protecting vehicle traffic from replay is itself reachable only
//! through a replay-protected channel.
//!
//! Because every process converges on the same lock arena inside one server,
//! at-most-once issuance holds across processes, not just threads.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────┐
//! │ len: u32 LE  │ bincode(AuthenticatedMessage<FvmRequest>)    │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Responses use the same framing with `FvmResponse` payloads, echo the
//! request's correlation id, and are signed with the client's shared secret.

pub mod client;
pub mod config;
pub mod ipc;
pub mod server;

pub use client::{ClientError, FvmClient};
pub use config::ServerConfig;
pub use server::FvmServer;
