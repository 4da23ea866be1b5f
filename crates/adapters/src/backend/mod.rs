// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound REST-style backend calls.
//!
//! The [`Backend`] trait is the seam between the action gateway and the
//! network. The production implementation is [`HttpBackend`];
//! [`FakeBackend`] (behind `test-support`) scripts responses for tests.

mod http;

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBackend, FakeCall};
pub use http::HttpBackend;

use async_trait::async_trait;
use fw_core::{JobId, SessionContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures from a backend call, already classified.
///
/// `Unauthorized` is the one variant with cross-cutting meaning: every
/// caller must translate it into the session-wide auth signal rather than
/// handling it locally.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Token rejected (HTTP 401/403 equivalent). Session-fatal, never
    /// retried.
    #[error("unauthorized")]
    Unauthorized,
    /// The backend understood and refused the request.
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    /// Connectivity or server failure; the caller may resubmit later.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Backend-confirmed result of a start submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartConfirmation {
    /// Authoritative start timestamp (epoch ms).
    pub started_at_ms: u64,
    /// Backend-corrected meter reading, when it overrides the submitted one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_reading: Option<i64>,
}

/// Backend-confirmed result of a complete submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteConfirmation {
    /// Authoritative completion timestamp (epoch ms).
    pub completed_at_ms: u64,
    /// Identifier the customer review link is generated from. Only valid
    /// once the backend has confirmed completion, which is why completion
    /// is never applied optimistically.
    #[serde(default)]
    pub review_ref: String,
}

/// The five outbound operations plus the category lookup.
///
/// Implementations perform the network call and classify the response; they
/// never touch the job store.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn start_breakdown(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        recall_reason: Option<&str>,
    ) -> Result<StartConfirmation, BackendError>;

    async fn complete_breakdown(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        solution_category: &str,
        solution_text: &str,
    ) -> Result<CompleteConfirmation, BackendError>;

    async fn start_service(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        meter_reading: Option<i64>,
    ) -> Result<StartConfirmation, BackendError>;

    async fn complete_service(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        solution_category: &str,
        solution_text: &str,
        closing_meter_reading: Option<i64>,
    ) -> Result<CompleteConfirmation, BackendError>;

    /// Record a recall justification on a due item. No status change.
    async fn submit_recall(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        reason: &str,
        on_site: bool,
    ) -> Result<(), BackendError>;

    /// Read-only enumerated list used as the completion guard's valid set.
    async fn solution_categories(
        &self,
        ctx: &SessionContext,
    ) -> Result<Vec<String>, BackendError>;
}
