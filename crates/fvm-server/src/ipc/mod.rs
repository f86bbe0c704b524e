//! Wire protocol of the FVM server boundary.

pub mod framing;
pub mod payloads;

use serde::Serialize;
use uuid::Uuid;

use fvm_types::security::{current_timestamp, sign_message};
use fvm_types::{AuthenticatedMessage, ClientId};

/// Sender id the server uses in response envelopes. Reserved: configuration
/// refuses to assign it to a client.
pub const SERVER_SENDER_ID: ClientId = ClientId(0);

/// Builds and signs an envelope around a payload.
pub fn sealed_message<T: Serialize + Clone>(
    sender: ClientId,
    correlation_id: Uuid,
    payload: T,
    secret: &[u8],
) -> Result<AuthenticatedMessage<T>, bincode::Error> {
    let mut message = AuthenticatedMessage {
        version: AuthenticatedMessage::<T>::CURRENT_VERSION,
        client_id: sender,
        correlation_id,
        timestamp: current_timestamp(),
        nonce: Uuid::new_v4(),
        signature: [0u8; 64],
        payload,
    };
    sign_message(&mut message, secret)?;
    Ok(message)
}
