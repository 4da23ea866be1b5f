// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fw-adapters: everything that touches a socket.
//!
//! The transport session owns the push channel (WebSocket, reconnecting);
//! the backend module owns the outbound REST-style calls. Both escalate
//! authorization failures through the one shared auth channel and nothing
//! here contains business logic.

pub mod backend;
pub mod config;
pub mod transport;

pub use backend::{Backend, BackendError, CompleteConfirmation, HttpBackend, StartConfirmation};
#[cfg(any(test, feature = "test-support"))]
pub use backend::{FakeBackend, FakeCall};
pub use config::{ConfigError, EndpointConfig};
pub use transport::{ConnState, TransportSession, TransportStatus, RECONNECT_SCHEDULE};
