//! Client side of the FVM socket protocol.
//!
//! Used by `fvm-admin` and the integration tests; application processes can
//! embed it directly. Each call sends one signed request frame and reads one
//! signed response frame, verifying the server's signature and the echoed
//! correlation id before trusting the payload.

use std::path::Path;

use thiserror::Error;
use tokio::net::UnixStream;
use uuid::Uuid;

use fvm_types::security::{signable_bytes, verify_bytes};
use fvm_types::{
    AuthenticatedMessage, ClientId, FreshnessValue, FvmError, IssuedFreshness,
    ManagerDiagnostics, SignalId, SignalStatus, Verdict,
};

use crate::ipc::framing::{read_frame, write_frame, FrameError};
use crate::ipc::payloads::{FvmRequest, FvmResponse};
use crate::ipc::sealed_message;

/// Client-side failures, separate from the manager's own taxonomy.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect: {0}")]
    Connect(#[from] std::io::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("server closed the connection (envelope rejected?)")]
    ConnectionClosed,
    #[error("response correlation id does not match the request")]
    CorrelationMismatch,
    #[error("server response signature invalid")]
    BadServerSignature,
    #[error("server answered with the wrong response kind")]
    UnexpectedResponse,
    #[error(transparent)]
    Manager(#[from] FvmError),
}

/// One authenticated connection to the FVM server.
pub struct FvmClient {
    stream: UnixStream,
    client_id: ClientId,
    secret: Vec<u8>,
}

impl FvmClient {
    /// Connects to the server socket as the given client.
    pub async fn connect<P: AsRef<Path>>(
        path: P,
        client_id: ClientId,
        secret: Vec<u8>,
    ) -> Result<Self, ClientError> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self {
            stream,
            client_id,
            secret,
        })
    }

    async fn call(&mut self, request: FvmRequest) -> Result<FvmResponse, ClientError> {
        let correlation_id = Uuid::new_v4();
        let message = sealed_message(self.client_id, correlation_id, request, &self.secret)
            .map_err(|e| ClientError::Frame(FrameError::Encoding(e)))?;

        write_frame(&mut self.stream, &message).await?;

        let reply: AuthenticatedMessage<FvmResponse> = read_frame(&mut self.stream)
            .await?
            .ok_or(ClientError::ConnectionClosed)?;

        if reply.correlation_id != correlation_id {
            return Err(ClientError::CorrelationMismatch);
        }
        let bytes = signable_bytes(&reply).map_err(|_| ClientError::BadServerSignature)?;
        if !verify_bytes(&bytes, &reply.signature, &self.secret) {
            return Err(ClientError::BadServerSignature);
        }

        Ok(reply.payload)
    }

    /// Issues the next freshness value for a Transmit-role signal.
    pub async fn issue(&mut self, signal_id: SignalId) -> Result<IssuedFreshness, ClientError> {
        match self.call(FvmRequest::Issue { signal_id }).await? {
            FvmResponse::Issued(result) => Ok(result?),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Validates a received truncated freshness value.
    pub async fn validate(
        &mut self,
        signal_id: SignalId,
        truncated: u64,
    ) -> Result<Verdict, ClientError> {
        match self.call(FvmRequest::Validate { signal_id, truncated }).await? {
            FvmResponse::Validated(result) => Ok(result?),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Administrative reset to a trusted full value.
    pub async fn reset(
        &mut self,
        signal_id: SignalId,
        new_value: FreshnessValue,
        authorization: Vec<u8>,
    ) -> Result<(), ClientError> {
        match self
            .call(FvmRequest::Reset {
                signal_id,
                new_value,
                authorization,
            })
            .await?
        {
            FvmResponse::ResetDone(result) => Ok(result?),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Counter status for one signal.
    pub async fn status(&mut self, signal_id: SignalId) -> Result<SignalStatus, ClientError> {
        match self.call(FvmRequest::Status { signal_id }).await? {
            FvmResponse::Status(result) => Ok(result?),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Manager-wide activity counters.
    pub async fn diagnostics(&mut self) -> Result<ManagerDiagnostics, ClientError> {
        match self.call(FvmRequest::Diagnostics).await? {
            FvmResponse::Diagnostics(diag) => Ok(diag),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}
