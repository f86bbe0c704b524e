//! fvm-server binary.
//!
//! Startup sequence:
//! 1. Initialize tracing (RUST_LOG-style env filter, default `info`)
//! 2. Load and validate the JSON configuration
//! 3. Open the counter snapshot (exclusive lock: one authority per counter
//!    space)
//! 4. Assemble the manager through the factory (configuration and key checks
//!    are fatal here, never at request time)
//! 5. Bind the Unix-domain socket and serve until SIGINT/SIGTERM

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fvm_core::adapters::demo_crypto::HmacCryptoAccessor;
use fvm_core::adapters::snapshot_store::FileSnapshotStore;
use fvm_core::adapters::static_config::StaticConfigAccessor;
use fvm_core::FvmFactory;
use fvm_server::{FvmServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "fvm.json".to_string());
    let config = ServerConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let store = Arc::new(
        FileSnapshotStore::open(&config.snapshot_path).context("opening counter snapshot")?,
    );
    let accessor = Arc::new(StaticConfigAccessor::new(
        config.signal_table(),
        config.reset_token_bytes().context("decoding reset token")?,
    ));
    let crypto = Arc::new(HmacCryptoAccessor::new(
        config.key_table().context("decoding key material")?,
    ));

    let manager = Arc::new(
        FvmFactory::assemble(accessor, store, crypto).context("assembling freshness manager")?,
    );
    let server = Arc::new(FvmServer::new(
        manager,
        config.client_secrets().context("decoding client secrets")?,
    ));

    // A previous unclean shutdown may have left the socket file behind; the
    // snapshot lock already guarantees we are the only authority.
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)
            .with_context(|| format!("removing stale socket {}", config.socket_path.display()))?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .with_context(|| format!("binding {}", config.socket_path.display()))?;
    info!(socket = %config.socket_path.display(), "fvm-server listening");

    let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    tokio::select! {
        result = Arc::clone(&server).serve(listener) => {
            result.context("accept loop failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("SIGINT received, shutting down");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received, shutting down");
        }
    }

    std::fs::remove_file(&config.socket_path).ok();
    info!("shutdown complete");
    Ok(())
}
