//! Integration tests for AkerBridge
//!
//! These tests run the bridge over a real Unix socket against a fake message
//! router that plays the part of aker.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use akerbridge::transport::Frame;
use akerbridge::{
    AckContext, AkerBridge, MsgpackEnvelope, NotificationBus, RequestKind, Rendezvous, ResponseDispatcher,
    RetryPolicy, SendError, ServiceStatus, SocketTransport, StaticIdentity, StatusError,
};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const MAC: &str = "11:22:33:44:55:66";

/// How the fake router answers status retrieves
#[derive(Clone, Copy)]
enum StatusReply {
    Online,
    Offline,
    Silent,
}

/// Fake router answering as aker would
///
/// Updates are acknowledged with 200, deletes rejected with 535.
fn spawn_router(socket_path: &Path, status: StatusReply) -> JoinHandle<()> {
    let listener = UnixListener::bind(socket_path).expect("Failed to bind router socket");
    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Ok(Frame::Request {
                kind,
                source,
                dest,
                transaction_uuid,
                ..
            }) = serde_json::from_str::<Frame>(&line)
            else {
                continue;
            };

            let device = source.split('/').next().unwrap_or_default().to_string();
            let (reply_source, code, payload) = match kind {
                RequestKind::Retrieve => {
                    let value = match status {
                        StatusReply::Online => "online",
                        StatusReply::Offline => "offline",
                        StatusReply::Silent => continue,
                    };
                    (
                        format!("{}/parodus/service-status/aker", device),
                        200,
                        format!(r#"{{"service-status":"{}"}}"#, value).into_bytes(),
                    )
                }
                RequestKind::Update => (dest, 200, MsgpackEnvelope::encode("Success").unwrap()),
                RequestKind::Delete => (dest, 535, MsgpackEnvelope::encode("bad config").unwrap()),
            };

            let response = Frame::Response {
                source: reply_source,
                dest: source,
                transaction_uuid: Some(transaction_uuid),
                status: code,
                payload,
            };
            let mut out = serde_json::to_string(&response).unwrap();
            out.push('\n');
            if write_half.write_all(out.as_bytes()).await.is_err() {
                return;
            }
        }
    })
}

struct Client {
    bridge: AkerBridge,
    notifications: broadcast::Receiver<String>,
}

async fn connect(socket_path: PathBuf) -> Client {
    let rendezvous = Arc::new(Rendezvous::new());
    let acks = Arc::new(AckContext::new());
    let bus = Arc::new(NotificationBus::default());
    let notifications = bus.subscribe();
    let dispatcher = ResponseDispatcher::new(rendezvous.clone(), acks.clone(), bus);

    let transport = SocketTransport::connect(socket_path, Arc::new(dispatcher), Duration::from_secs(2))
        .await
        .expect("Failed to connect to router");

    let bridge = AkerBridge::new(
        Arc::new(transport),
        Arc::new(StaticIdentity::from_mac(MAC)),
        rendezvous,
        acks,
    )
    .with_policy(RetryPolicy::new(2, Duration::from_millis(10)))
    .with_status_timeout(Duration::from_secs(2));

    Client { bridge, notifications }
}

async fn next_notification(rx: &mut broadcast::Receiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("No notification in time")
        .expect("Notification channel closed")
}

// =============================================================================
// Status Tests
// =============================================================================

#[tokio::test]
async fn test_status_online() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let socket_path = temp_dir.path().join("bus.sock");
    let _router = spawn_router(&socket_path, StatusReply::Online);

    let client = connect(socket_path).await;

    assert_eq!(client.bridge.check_status().await, Ok(ServiceStatus::Online));
}

#[tokio::test]
async fn test_status_offline() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let socket_path = temp_dir.path().join("bus.sock");
    let _router = spawn_router(&socket_path, StatusReply::Offline);

    let client = connect(socket_path).await;

    assert_eq!(
        client.bridge.check_status().await,
        Ok(ServiceStatus::NotOnline("offline".to_string()))
    );
}

#[tokio::test]
async fn test_status_times_out_when_peer_silent() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let socket_path = temp_dir.path().join("bus.sock");
    let _router = spawn_router(&socket_path, StatusReply::Silent);

    let client = connect(socket_path).await;

    assert_eq!(
        client.bridge.check_status().await,
        Err(StatusError::TimedOut(Duration::from_secs(2)))
    );
}

#[tokio::test]
async fn test_repeated_status_checks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let socket_path = temp_dir.path().join("bus.sock");
    let _router = spawn_router(&socket_path, StatusReply::Online);

    let client = connect(socket_path).await;

    for _ in 0..3 {
        assert_eq!(client.bridge.check_status().await, Ok(ServiceStatus::Online));
    }
}

// =============================================================================
// Managed Request Tests
// =============================================================================

#[tokio::test]
async fn test_update_acknowledged() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let socket_path = temp_dir.path().join("bus.sock");
    let _router = spawn_router(&socket_path, StatusReply::Online);

    let mut client = connect(socket_path).await;
    client
        .bridge
        .send_managed_request(RequestKind::Update, Some(br#"{"events":[]}"#.to_vec()), 4321, 17)
        .await
        .expect("Update should be sent");

    assert_eq!(next_notification(&mut client.notifications).await, "aker,4321,17,ACK,0");
}

#[tokio::test]
async fn test_delete_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let socket_path = temp_dir.path().join("bus.sock");
    let _router = spawn_router(&socket_path, StatusReply::Online);

    let mut client = connect(socket_path).await;
    client
        .bridge
        .send_managed_request(RequestKind::Delete, None, 7, 3)
        .await
        .expect("Delete should be sent");

    assert_eq!(
        next_notification(&mut client.notifications).await,
        "aker,7,3,NACK,0,aker,535,bad config"
    );
}

#[tokio::test]
async fn test_send_fails_after_router_goes_away() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let socket_path = temp_dir.path().join("bus.sock");
    let router = spawn_router(&socket_path, StatusReply::Online);

    let client = connect(socket_path).await;
    router.abort();
    let _ = router.await;

    // The first write after the peer closes may still be buffered by the kernel;
    // keep sending until the broken connection surfaces.
    let mut last = Ok(());
    for _ in 0..10 {
        last = client
            .bridge
            .send_managed_request(RequestKind::Delete, None, 1, 1)
            .await;
        if last.is_err() {
            break;
        }
    }

    assert!(matches!(last, Err(SendError::RetriesExhausted { attempts: 2, .. })));
}
