// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Technician session context and the uniform authorization signal.

use tokio::sync::mpsc;

crate::define_id! {
    /// Technician login code; keys the push-channel subscription.
    pub struct TechCode;
}

/// Explicit session context injected at construction.
///
/// Replaces ambient global auth state: the transport session and action
/// gateway receive this value and never read identity or tokens from
/// anywhere else.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub tech_code: TechCode,
    /// Bearer token presented on every backend call.
    pub token: String,
    /// Opaque company scope passed through to backend calls unchanged.
    pub company: String,
}

impl SessionContext {
    pub fn new(tech_code: impl Into<TechCode>, token: impl Into<String>) -> Self {
        Self { tech_code: tech_code.into(), token: token.into(), company: String::new() }
    }

    crate::setters! {
        into {
            company: String,
        }
    }
}

/// Session-fatal signals that every network-touching component escalates
/// identically, regardless of which call tripped them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSignal {
    /// Token rejected; the UI must force re-authentication. Never retried.
    Unauthorized,
}

/// Fan-in sender half of the auth signal channel.
///
/// Clone one into every component that talks to the backend. There is
/// exactly one receiver, owned by the UI boundary.
#[derive(Debug, Clone)]
pub struct AuthSender(mpsc::UnboundedSender<AuthSignal>);

impl AuthSender {
    pub fn unauthorized(&self) {
        // Receiver dropped means the UI is gone; nothing left to sign out.
        let _ = self.0.send(AuthSignal::Unauthorized);
    }
}

pub type AuthReceiver = mpsc::UnboundedReceiver<AuthSignal>;

/// Create the session-wide auth signal channel.
pub fn auth_channel() -> (AuthSender, AuthReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AuthSender(tx), rx)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
