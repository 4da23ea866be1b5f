// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport session: one reconnecting push connection per technician.
//!
//! Owns connectivity and nothing else. Raw text frames fan out to every
//! registered handler; missed frames during a reconnect gap are not
//! replayed — completeness is the bulk-refresh collaborator's problem.

mod backoff;

pub use backoff::{delay, RECONNECT_SCHEDULE};

use crate::config::{ConfigError, EndpointConfig};
use fw_core::{AuthSender, SessionContext};
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;

/// Connection lifecycle state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

fw_core::simple_display! {
    ConnState {
        Disconnected => "disconnected",
        Connecting => "connecting",
        Connected => "connected",
        Reconnecting => "reconnecting",
    }
}

/// Side-channel connectivity reports. Informational: callers render a
/// passive indicator, they never see these as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportStatus {
    Connected,
    ConnectFailed(String),
    Dropped(String),
    /// Handshake rejected the token. Also escalated on the session-wide
    /// auth channel; retries stop.
    Unauthorized,
}

type FrameHandler = Arc<dyn Fn(&str) + Send + Sync>;
type StatusHandler = Arc<dyn Fn(&TransportStatus) + Send + Sync>;

#[derive(Default)]
struct Handlers {
    frames: Mutex<Vec<FrameHandler>>,
    status: Mutex<Vec<StatusHandler>>,
}

impl Handlers {
    fn dispatch_frame(&self, raw: &str) {
        let handlers: Vec<FrameHandler> = self.frames.lock().clone();
        for handler in handlers {
            handler(raw);
        }
    }

    fn dispatch_status(&self, status: &TransportStatus) {
        let handlers: Vec<StatusHandler> = self.status.lock().clone();
        for handler in handlers {
            handler(status);
        }
    }
}

struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// One logical push connection for one technician identity, independent of
/// how many views are mounted.
pub struct TransportSession {
    ctx: SessionContext,
    config: EndpointConfig,
    auth: AuthSender,
    handlers: Arc<Handlers>,
    state_tx: watch::Sender<ConnState>,
    state_rx: watch::Receiver<ConnState>,
    running: Mutex<Option<Running>>,
}

impl TransportSession {
    pub fn new(ctx: SessionContext, config: EndpointConfig, auth: AuthSender) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnState::Disconnected);
        Self {
            ctx,
            config,
            auth,
            handlers: Arc::new(Handlers::default()),
            state_tx,
            state_rx,
            running: Mutex::new(None),
        }
    }

    /// Register a consumer of raw inbound frames. Multiple handlers are
    /// allowed; each sees every frame, order unspecified.
    pub fn on_event(&self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.handlers.frames.lock().push(Arc::new(handler));
    }

    /// Register a consumer of connectivity status reports.
    pub fn on_status(&self, handler: impl Fn(&TransportStatus) + Send + Sync + 'static) {
        self.handlers.status.lock().push(Arc::new(handler));
    }

    pub fn state(&self) -> ConnState {
        *self.state_rx.borrow()
    }

    /// Watch channel for state transitions; the UI's reconnect indicator
    /// hangs off this.
    pub fn watch_state(&self) -> watch::Receiver<ConnState> {
        self.state_rx.clone()
    }

    /// Start the connection task. Idempotent: a session that is already
    /// running is left alone. Connection failures are reported through the
    /// status side-channel, never returned from here.
    pub fn open(&self) -> Result<(), ConfigError> {
        if self.ctx.tech_code.is_empty() {
            return Err(ConfigError::EmptyTechCode);
        }

        let mut running = self.running.lock();
        if let Some(current) = running.as_ref() {
            if !current.task.is_finished() {
                tracing::debug!(tech = %self.ctx.tech_code, "transport: open is a no-op, already running");
                return Ok(());
            }
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(
            self.config.ws_url(&self.ctx.tech_code),
            self.config.clone(),
            self.handlers.clone(),
            self.state_tx.clone(),
            self.auth.clone(),
            cancel.clone(),
        ));
        *running = Some(Running { cancel, task });
        Ok(())
    }

    /// Release the transport and suppress further retries. Safe from any
    /// state; in-flight gateway calls are unaffected.
    pub fn close(&self) {
        if let Some(running) = self.running.lock().take() {
            running.cancel.cancel();
        }
        let _ = self.state_tx.send(ConnState::Disconnected);
        tracing::info!(tech = %self.ctx.tech_code, "transport: closed");
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        if let Some(running) = self.running.lock().take() {
            running.cancel.cancel();
        }
    }
}

/// Connection loop: connect, pump frames, reconnect on schedule.
async fn run(
    url: String,
    config: EndpointConfig,
    handlers: Arc<Handlers>,
    state_tx: watch::Sender<ConnState>,
    auth: AuthSender,
    cancel: CancellationToken,
) {
    // Attempts since the last successful connection; indexes the backoff
    // schedule.
    let mut attempt: usize = 0;
    let mut ever_connected = false;

    loop {
        if cancel.is_cancelled() {
            break;
        }
        let _ = state_tx.send(if ever_connected {
            ConnState::Reconnecting
        } else {
            ConnState::Connecting
        });

        match connect(&url, &config, &cancel).await {
            ConnectOutcome::Connected(ws) => {
                attempt = 0;
                ever_connected = true;
                let _ = state_tx.send(ConnState::Connected);
                handlers.dispatch_status(&TransportStatus::Connected);
                tracing::info!(%url, "transport: connected");

                let reason = pump(ws, &handlers, &cancel).await;
                if cancel.is_cancelled() {
                    break;
                }
                tracing::warn!(%url, %reason, "transport: connection dropped");
                handlers.dispatch_status(&TransportStatus::Dropped(reason));
            }
            ConnectOutcome::Unauthorized => {
                // Session-fatal: stop retrying, same contract as the gateway.
                tracing::warn!(%url, "transport: handshake unauthorized");
                handlers.dispatch_status(&TransportStatus::Unauthorized);
                auth.unauthorized();
                break;
            }
            ConnectOutcome::Failed(reason) => {
                if cancel.is_cancelled() {
                    break;
                }
                tracing::warn!(%url, %reason, "transport: connect failed");
                handlers.dispatch_status(&TransportStatus::ConnectFailed(reason));
            }
            ConnectOutcome::Cancelled => break,
        }

        let delay = backoff::delay(attempt);
        attempt += 1;
        let _ = state_tx.send(ConnState::Reconnecting);
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let _ = state_tx.send(ConnState::Disconnected);
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

enum ConnectOutcome {
    Connected(Box<WsStream>),
    Unauthorized,
    Failed(String),
    Cancelled,
}

async fn connect(url: &str, config: &EndpointConfig, cancel: &CancellationToken) -> ConnectOutcome {
    let attempt = tokio::time::timeout(
        config.connect_timeout(),
        tokio_tungstenite::connect_async(url),
    );
    tokio::select! {
        _ = cancel.cancelled() => ConnectOutcome::Cancelled,
        result = attempt => match result {
            Ok(Ok((ws, _response))) => ConnectOutcome::Connected(Box::new(ws)),
            Ok(Err(error)) => {
                if is_unauthorized(&error) {
                    ConnectOutcome::Unauthorized
                } else {
                    ConnectOutcome::Failed(error.to_string())
                }
            }
            Err(_elapsed) => ConnectOutcome::Failed("connect timed out".into()),
        },
    }
}

fn is_unauthorized(error: &tungstenite::Error) -> bool {
    match error {
        tungstenite::Error::Http(response) => {
            matches!(response.status().as_u16(), 401 | 403)
        }
        _ => false,
    }
}

/// Pump frames until the stream ends. Returns the drop reason.
async fn pump(ws: Box<WsStream>, handlers: &Handlers, cancel: &CancellationToken) -> String {
    let (_, mut read) = ws.split();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return "closed by caller".into(),
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => handlers.dispatch_frame(text.as_str()),
                Some(Ok(Message::Close(frame))) => {
                    return match frame {
                        Some(frame) => format!("close frame: {}", frame.reason),
                        None => "close frame".into(),
                    };
                }
                Some(Ok(_)) => {} // Ping/Pong/Binary — ignore
                Some(Err(error)) => return error.to_string(),
                None => return "stream ended".into(),
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
