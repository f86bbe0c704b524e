//! Accept loop and per-connection protocol.
//!
//! One task per connection; each frame is verified (version, timestamp,
//! nonce, HMAC) before dispatch. A frame that fails verification closes the
//! connection: a peer that cannot authenticate gets no protocol feedback to
//! probe with. Manager calls run on the blocking pool because acceptance
//! persists to disk before returning.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use fvm_core::{FreshnessApi, FreshnessValueManager};
use fvm_types::security::{EnvelopeVerifier, NonceCache, StaticKeyProvider};
use fvm_types::{AuthenticatedMessage, ClientId};

use crate::ipc::framing::{read_frame, write_frame};
use crate::ipc::payloads::{FvmRequest, FvmResponse};
use crate::ipc::{sealed_message, SERVER_SENDER_ID};

/// The socket-facing wrapper around one [`FreshnessValueManager`].
pub struct FvmServer {
    manager: Arc<FreshnessValueManager>,
    verifier: EnvelopeVerifier<StaticKeyProvider>,
    secrets: HashMap<ClientId, Vec<u8>>,
}

impl FvmServer {
    /// Wraps a manager with the given per-client envelope secrets.
    pub fn new(manager: Arc<FreshnessValueManager>, secrets: HashMap<ClientId, Vec<u8>>) -> Self {
        let verifier = EnvelopeVerifier::new(
            NonceCache::new_shared(),
            StaticKeyProvider::new(secrets.clone()),
        );
        Self {
            manager,
            verifier,
            secrets,
        }
    }

    /// Serves connections until the listener fails. Intended to be raced
    /// against a shutdown signal by the caller.
    pub async fn serve(self: Arc<Self>, listener: UnixListener) -> std::io::Result<()> {
        info!(signals = self.manager.signal_ids().len(), "fvm-server accepting connections");
        loop {
            let (stream, _addr) = listener.accept().await?;
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                server.handle_connection(stream).await;
            });
        }
    }

    async fn handle_connection(&self, mut stream: UnixStream) {
        loop {
            let message: AuthenticatedMessage<FvmRequest> = match read_frame(&mut stream).await {
                Ok(Some(m)) => m,
                Ok(None) => return,
                Err(e) => {
                    warn!(error = %e, "malformed frame, closing connection");
                    return;
                }
            };

            let verdict = self.verifier.verify(&message);
            if !verdict.is_valid() {
                warn!(
                    client = %message.client_id,
                    ?verdict,
                    "envelope rejected at the boundary"
                );
                return;
            }

            // Verified above, so the secret exists.
            let Some(secret) = self.secrets.get(&message.client_id).cloned() else {
                return;
            };

            let manager = Arc::clone(&self.manager);
            let request = message.payload.clone();
            let response = match tokio::task::spawn_blocking(move || dispatch(&manager, request))
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    error!(error = %e, "dispatch task failed");
                    return;
                }
            };

            let reply =
                match sealed_message(SERVER_SENDER_ID, message.correlation_id, response, &secret) {
                    Ok(r) => r,
                    Err(e) => {
                        error!(error = %e, "response signing failed");
                        return;
                    }
                };

            if let Err(e) = write_frame(&mut stream, &reply).await {
                debug!(error = %e, "client went away mid-response");
                return;
            }
        }
    }
}

fn dispatch(manager: &FreshnessValueManager, request: FvmRequest) -> FvmResponse {
    match request {
        FvmRequest::Issue { signal_id } => {
            FvmResponse::Issued(manager.get_freshness_for_transmit(signal_id))
        }
        FvmRequest::Validate {
            signal_id,
            truncated,
        } => FvmResponse::Validated(manager.verify_freshness_on_receive(signal_id, truncated)),
        FvmRequest::Reset {
            signal_id,
            new_value,
            authorization,
        } => FvmResponse::ResetDone(manager.reset_signal(signal_id, new_value, &authorization)),
        FvmRequest::Status { signal_id } => FvmResponse::Status(manager.sync_status(signal_id)),
        FvmRequest::Diagnostics => FvmResponse::Diagnostics(manager.diagnostics()),
    }
}
