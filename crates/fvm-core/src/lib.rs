//! # Freshness Value Manager Core
//!
//! Supplies and validates monotonically-increasing freshness counters used to
//! authenticate signals on an in-vehicle network. Senders attach a truncated
//! freshness value to each authenticated message; receivers reconstruct the
//! full value and accept the message only if it is newer than the last
//! accepted one for that signal.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Transmit counters increase by exactly 1, never repeat | `domain/signal_state.rs` - `plan_issue()` |
//! | INVARIANT-2 | No silent wraparound: issuance at `2^W - 1` fails with `Overflow` | `domain/signal_state.rs` - overflow check before increment |
//! | INVARIANT-3 | At-most-once issuance across concurrent callers | `domain/arena.rs` - one mutex per signal entry |
//! | INVARIANT-4 | Receive accepts only reconstructions strictly newer than `last_accepted` | `domain/reconstruction.rs` |
//! | INVARIANT-5 | Persist-before-commit: no value is handed out before storage confirms | `service.rs` - `persist_value` ordering |
//! | INVARIANT-6 | Restart resumes from the persisted counter, never from 0 | `factory.rs` - `load_value` at assembly |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - static config table, in-memory + file snapshot    │
//! │              attribute stores, HMAC demo crypto accessor        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - FreshnessApi trait                         │
//! │  ports/outbound.rs - ConfigAccessor, RuntimeAttributesStore,    │
//! │                      CryptoServiceAccessor traits               │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/reconstruction.rs - truncated-counter arithmetic        │
//! │  domain/signal_state.rs   - per-signal counter state machine    │
//! │  domain/arena.rs          - lock arena (one mutex per signal)   │
//! │  domain/diagnostics.rs    - manager-wide counters               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Synchronization State Machine (receive side)
//!
//! ```text
//! [Unsynchronized] ──first value accepted──→ [Synchronized]
//!                                                 │    ↑
//!                       candidate beyond window   │    │ authorized reset
//!                                                 ↓    │
//!                                           [OutOfWindow]
//! ```
//!
//! `Stale` rejections keep the counter `Synchronized`; `OutOfWindow` is only
//! left through an authorized reset. Conflating the two would either enable
//! replay or cause persistent denial of service.

pub mod adapters;
pub mod domain;
pub mod factory;
pub mod ports;
pub mod service;

pub use factory::FvmFactory;
pub use ports::inbound::FreshnessApi;
pub use ports::outbound::{ConfigAccessor, CryptoServiceAccessor, RuntimeAttributesStore};
pub use service::FreshnessValueManager;
