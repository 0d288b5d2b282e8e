//! Connection manager lifecycle against an in-process WebSocket server.

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use spectrum_core::ConnectionState;
use spectrum_core::ws::{
    ConnectionManager, FixedDelay, StreamEvent, StreamEventReceiver, WsConnConfig,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

async fn next_event(rx: &mut StreamEventReceiver) -> Option<StreamEvent> {
    tokio::time::timeout(WAIT, rx.recv()).await.expect("timed out waiting for event")
}

fn state(conn_id: u64, state: ConnectionState) -> StreamEvent {
    StreamEvent::State { conn_id, state }
}

/// Address that refuses connections.
async fn refused_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}")
}

#[tokio::test]
async fn lost_connection_schedules_one_reconnect_with_new_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        // First connection: one frame, then drop without a close handshake.
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        ws.send(Message::Text(r#"{"Velocity": 1}"#.to_string().into())).await.unwrap();
        drop(ws);

        // Second connection stays up until the test ends.
        let (tcp, _) = listener.accept().await.unwrap();
        let _ws = accept_async(tcp).await.unwrap();
        std::future::pending::<()>().await;
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut manager = ConnectionManager::start(
        WsConnConfig::new(format!("ws://{addr}")),
        Arc::new(FixedDelay::forever(Duration::from_millis(20))),
        tx,
    );

    let mut seen = Vec::new();
    while let Some(ev) = next_event(&mut rx).await {
        let done = ev == state(2, ConnectionState::Open);
        seen.push(ev);
        if done {
            break;
        }
    }

    assert_eq!(
        seen,
        vec![
            state(1, ConnectionState::Connecting),
            state(1, ConnectionState::Open),
            StreamEvent::Frame { conn_id: 1, text: r#"{"Velocity": 1}"#.into() },
            state(1, ConnectionState::Reconnecting),
            state(2, ConnectionState::Connecting),
            state(2, ConnectionState::Open),
        ]
    );
    assert_eq!(manager.state(), ConnectionState::Open);

    manager.shutdown().await;
    assert_eq!(next_event(&mut rx).await, Some(state(2, ConnectionState::Closed)));
    assert_eq!(next_event(&mut rx).await, None);
    assert_eq!(manager.state(), ConnectionState::Closed);

    server.abort();
}

#[tokio::test]
async fn bounded_policy_gives_up_and_closes() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let manager = ConnectionManager::start(
        WsConnConfig::new(refused_addr().await),
        Arc::new(FixedDelay::bounded(Duration::from_millis(10), 2)),
        tx,
    );

    let mut connecting = 0;
    let mut reconnecting = 0;
    loop {
        match next_event(&mut rx).await {
            Some(StreamEvent::State { state: ConnectionState::Connecting, .. }) => connecting += 1,
            Some(StreamEvent::State { state: ConnectionState::Reconnecting, .. }) => {
                reconnecting += 1
            }
            Some(StreamEvent::State { state: ConnectionState::Closed, conn_id }) => {
                assert_eq!(conn_id, 3);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(connecting, 3, "initial attempt plus two retries");
    assert_eq!(reconnecting, 2);
    assert_eq!(manager.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn shutdown_during_backoff_cancels_pending_attempt() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut manager = ConnectionManager::start(
        WsConnConfig::new(refused_addr().await),
        Arc::new(FixedDelay::forever(Duration::from_secs(60))),
        tx,
    );

    assert_eq!(next_event(&mut rx).await, Some(state(1, ConnectionState::Connecting)));
    assert_eq!(next_event(&mut rx).await, Some(state(1, ConnectionState::Reconnecting)));

    manager.shutdown().await;
    assert_eq!(next_event(&mut rx).await, Some(state(1, ConnectionState::Closed)));
    assert_eq!(next_event(&mut rx).await, None, "no further attempts after shutdown");
}
