//! End-to-end socket protocol tests.
//!
//! A real server over a real Unix-domain socket in a temp directory, with
//! counters persisted through a real snapshot file. Exercises both the happy
//! paths and the envelope security boundary.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    use tokio::net::{UnixListener, UnixStream};
    use uuid::Uuid;

    use fvm_core::adapters::demo_crypto::HmacCryptoAccessor;
    use fvm_core::adapters::snapshot_store::FileSnapshotStore;
    use fvm_core::adapters::static_config::StaticConfigAccessor;
    use fvm_core::FvmFactory;
    use fvm_server::ipc::framing::{read_frame, write_frame};
    use fvm_server::ipc::payloads::{FvmRequest, FvmResponse};
    use fvm_server::ipc::sealed_message;
    use fvm_server::{ClientError, FvmClient, FvmServer};
    use fvm_types::security::{current_timestamp, sign_message};
    use fvm_types::{
        AuthenticatedMessage, ClientId, FvmError, KeyId, SignalId, SignalRole, Verdict,
    };

    use crate::integration::{signal_config, RESET_TOKEN};

    const CLIENT: ClientId = ClientId(7);
    const SECRET: &[u8] = b"socket_test_client_secret";

    /// Starts a server over a fresh socket and snapshot. The `TempDir` keeps
    /// both paths alive for the test's duration.
    fn start_server() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("fvm.sock");
        let snapshot = dir.path().join("counters.fvms");

        let table = StaticConfigAccessor::new(HashMap::new(), RESET_TOKEN.to_vec())
            .with_signal(SignalId(1), signal_config(SignalRole::Transmit))
            .with_signal(SignalId(2), signal_config(SignalRole::Receive));
        let store = Arc::new(FileSnapshotStore::open(&snapshot).unwrap());
        let crypto =
            Arc::new(HmacCryptoAccessor::default().with_key(KeyId(1), b"socket_key".to_vec()));
        let manager = Arc::new(FvmFactory::assemble(Arc::new(table), store, crypto).unwrap());

        let mut secrets = HashMap::new();
        secrets.insert(CLIENT, SECRET.to_vec());
        let server = Arc::new(FvmServer::new(manager, secrets));

        let listener = UnixListener::bind(&socket).unwrap();
        tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        (dir, socket)
    }

    async fn connect(socket: &PathBuf) -> FvmClient {
        FvmClient::connect(socket, CLIENT, SECRET.to_vec())
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_issue_status_diagnostics_round_trip() {
        let (_dir, socket) = start_server();
        let mut client = connect(&socket).await;

        let first = client.issue(SignalId(1)).await.unwrap();
        assert_eq!(first.full_value, 1);
        let second = client.issue(SignalId(1)).await.unwrap();
        assert_eq!(second.full_value, 2);

        let status = client.status(SignalId(1)).await.unwrap();
        assert_eq!(status.last_value, Some(2));

        let diag = client.diagnostics().await.unwrap();
        assert_eq!(diag.issued, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_validate_and_reset_over_the_wire() {
        let (_dir, socket) = start_server();
        let mut client = connect(&socket).await;

        // bootstrap, then replay
        assert_eq!(
            client.validate(SignalId(2), 50).await.unwrap(),
            Verdict::Accepted { full_value: 50 }
        );
        assert!(!client.validate(SignalId(2), 50).await.unwrap().is_accepted());

        // drift out of the window, wrong token, right token
        assert!(!client.validate(SignalId(2), 120).await.unwrap().is_accepted());
        let err = client
            .reset(SignalId(2), 300, b"wrong".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Manager(FvmError::Unauthorized)));

        client
            .reset(SignalId(2), 300, RESET_TOKEN.to_vec())
            .await
            .unwrap();
        assert_eq!(
            client.validate(SignalId(2), 45).await.unwrap(),
            Verdict::Accepted { full_value: 301 }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_manager_errors_travel_typed() {
        let (_dir, socket) = start_server();
        let mut client = connect(&socket).await;

        let err = client.issue(SignalId(99)).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Manager(FvmError::UnknownSignal(SignalId(99)))
        ));

        let err = client.issue(SignalId(2)).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Manager(FvmError::RoleMismatch { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wrong_secret_is_cut_off_without_feedback() {
        let (_dir, socket) = start_server();

        let mut client = FvmClient::connect(&socket, CLIENT, b"not_the_secret".to_vec())
            .await
            .unwrap();
        let err = client.issue(SignalId(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_client_id_is_cut_off() {
        let (_dir, socket) = start_server();

        let mut client = FvmClient::connect(&socket, ClientId(99), SECRET.to_vec())
            .await
            .unwrap();
        let err = client.issue(SignalId(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_replayed_envelope_is_rejected() {
        let (_dir, socket) = start_server();
        let mut stream = UnixStream::connect(&socket).await.unwrap();

        let message = sealed_message(
            CLIENT,
            Uuid::new_v4(),
            FvmRequest::Issue { signal_id: SignalId(1) },
            SECRET,
        )
        .unwrap();

        // first delivery succeeds
        write_frame(&mut stream, &message).await.unwrap();
        let reply: Option<AuthenticatedMessage<FvmResponse>> =
            read_frame(&mut stream).await.unwrap();
        assert!(matches!(
            reply.unwrap().payload,
            FvmResponse::Issued(Ok(_))
        ));

        // the byte-identical frame again: nonce already consumed
        write_frame(&mut stream, &message).await.unwrap();
        let reply: Option<AuthenticatedMessage<FvmResponse>> =
            read_frame(&mut stream).await.unwrap();
        assert!(reply.is_none(), "replayed envelope must not be answered");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stale_timestamp_is_rejected() {
        let (_dir, socket) = start_server();
        let mut stream = UnixStream::connect(&socket).await.unwrap();

        let mut message = AuthenticatedMessage {
            version: AuthenticatedMessage::<FvmRequest>::CURRENT_VERSION,
            client_id: CLIENT,
            correlation_id: Uuid::new_v4(),
            timestamp: current_timestamp() - 3600,
            nonce: Uuid::new_v4(),
            signature: [0u8; 64],
            payload: FvmRequest::Issue { signal_id: SignalId(1) },
        };
        sign_message(&mut message, SECRET).unwrap();

        write_frame(&mut stream, &message).await.unwrap();
        let reply: Option<AuthenticatedMessage<FvmResponse>> =
            read_frame(&mut stream).await.unwrap();
        assert!(reply.is_none(), "stale envelope must not be answered");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_at_most_once_holds_across_connections() {
        let (_dir, socket) = start_server();

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let socket = socket.clone();
            tasks.push(tokio::spawn(async move {
                let mut client = FvmClient::connect(&socket, CLIENT, SECRET.to_vec())
                    .await
                    .unwrap();
                let mut values = Vec::new();
                for _ in 0..25 {
                    values.push(client.issue(SignalId(1)).await.unwrap().full_value);
                }
                values
            }));
        }

        let mut all = Vec::new();
        for task in tasks {
            all.extend(task.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (1..=100).collect::<Vec<u64>>());
    }
}
