// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport session against a live loopback WebSocket server.

use fw_adapters::{ConnState, EndpointConfig, TransportSession, TransportStatus};
use fw_core::{auth_channel, AuthReceiver, AuthSignal, SessionContext};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

fn config(port: u16) -> EndpointConfig {
    EndpointConfig {
        host: "127.0.0.1".into(),
        port,
        connect_timeout_ms: 2_000,
        ..EndpointConfig::default()
    }
}

fn session(port: u16) -> (TransportSession, AuthReceiver) {
    let (auth_tx, auth_rx) = auth_channel();
    let session = TransportSession::new(
        SessionContext::new("T-1180", "token"),
        config(port),
        auth_tx,
    );
    (session, auth_rx)
}

async fn wait_for_state(
    rx: &mut watch::Receiver<ConnState>,
    wanted: ConnState,
    timeout: Duration,
) -> bool {
    tokio::time::timeout(timeout, async {
        loop {
            if *rx.borrow() == wanted {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    })
    .await
    .is_ok()
}

#[tokio::test]
async fn connects_and_fans_frames_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text("{\"a\":1}".into())).await.unwrap();
        ws.send(Message::Text("{\"a\":2}".into())).await.unwrap();
        // Hold the connection open until the client goes away
        while ws.next().await.is_some() {}
    });

    let (session, _auth_rx) = session(port);
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
    session.on_event(move |raw| {
        let _ = frame_tx.send(raw.to_string());
    });

    let mut states = session.watch_state();
    session.open().unwrap();

    assert!(wait_for_state(&mut states, ConnState::Connected, Duration::from_secs(5)).await);
    let first = tokio::time::timeout(Duration::from_secs(5), frame_rx.recv()).await.unwrap();
    let second = tokio::time::timeout(Duration::from_secs(5), frame_rx.recv()).await.unwrap();
    assert_eq!(first.as_deref(), Some("{\"a\":1}"));
    assert_eq!(second.as_deref(), Some("{\"a\":2}"));

    session.close();
    assert_eq!(session.state(), ConnState::Disconnected);
}

#[tokio::test]
async fn reconnects_after_drop_without_replaying() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        // First connection: one frame, then an abrupt drop
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text("{\"seq\":\"A\"}".into())).await.unwrap();
        drop(ws);

        // Second connection: the post-reconnect frame, then stay open
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text("{\"seq\":\"B\"}".into())).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let (session, _auth_rx) = session(port);
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
    session.on_event(move |raw| {
        let _ = frame_tx.send(raw.to_string());
    });
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    session.on_status(move |status| {
        let _ = status_tx.send(status.clone());
    });

    let mut states = session.watch_state();
    session.open().unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), frame_rx.recv()).await.unwrap();
    assert_eq!(first.as_deref(), Some("{\"seq\":\"A\"}"));

    // The drop is reported and the session comes back on its own (first
    // retry is immediate); the frame sent before the gap is not replayed
    let second = tokio::time::timeout(Duration::from_secs(10), frame_rx.recv()).await.unwrap();
    assert_eq!(second.as_deref(), Some("{\"seq\":\"B\"}"));

    let mut saw_connected = 0;
    let mut saw_dropped = 0;
    while let Ok(status) = status_rx.try_recv() {
        match status {
            TransportStatus::Connected => saw_connected += 1,
            TransportStatus::Dropped(_) => saw_dropped += 1,
            other => panic!("unexpected status: {:?}", other),
        }
    }
    assert_eq!(saw_connected, 2);
    assert_eq!(saw_dropped, 1);

    assert!(wait_for_state(&mut states, ConnState::Connected, Duration::from_secs(5)).await);
    session.close();
}

#[tokio::test]
async fn unauthorized_handshake_signals_and_stops_retrying() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepts = Arc::new(AtomicUsize::new(0));
    let accepts_in_server = accepts.clone();

    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            accepts_in_server.fetch_add(1, Ordering::SeqCst);
            // Read the upgrade request, then refuse it
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            loop {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }
            let _ = stream
                .write_all(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\n\r\n")
                .await;
        }
    });

    let (session, mut auth_rx) = session(port);
    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    session.on_status(move |status| {
        let _ = status_tx.send(status.clone());
    });

    let mut states = session.watch_state();
    session.open().unwrap();

    // The rejection raises the same global signal the gateway uses
    let signal = tokio::time::timeout(Duration::from_secs(5), auth_rx.recv()).await.unwrap();
    assert_eq!(signal, Some(AuthSignal::Unauthorized));

    let status = tokio::time::timeout(Duration::from_secs(5), status_rx.recv()).await.unwrap();
    assert_eq!(status, Some(TransportStatus::Unauthorized));

    // Auth failures are session-fatal: no retry loop
    assert!(wait_for_state(&mut states, ConnState::Disconnected, Duration::from_secs(5)).await);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(accepts.load(Ordering::SeqCst), 1);
}
