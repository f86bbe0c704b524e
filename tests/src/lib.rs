//! # FVM Test Suite
//!
//! Unified integration crate exercising the freshness manager through its
//! public seams: the manager API, the snapshot store across restarts, and
//! the full socket protocol.
//!
//! ## Structure
//!
//! ```text
//! tests/src/integration/
//! ├── freshness_flows.rs   # issue/validate/resync flows through the API
//! ├── concurrency.rs       # at-most-once issuance under contention
//! ├── persistence.rs       # restart-resumes-from-snapshot behavior
//! └── server_roundtrip.rs  # end-to-end socket protocol and envelope security
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fvm-tests
//! cargo test -p fvm-tests integration::server_roundtrip::
//! ```

#![allow(dead_code)]

pub mod integration;
