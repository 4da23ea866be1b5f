// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action gateway: technician-initiated transitions.
//!
//! Each submit validates locally first (fail fast), then performs the
//! remote call while holding the identity lock, and applies the transition
//! only on backend confirmation. Authorization failures are escalated on
//! the session-wide auth channel — the same signal the transport session
//! raises — never handled per call site.

use crate::lifecycle::LifecycleEngine;
use fw_adapters::{Backend, BackendError};
use fw_core::{
    AuthSender, Clock, Job, JobKey, JobKind, SessionContext, SystemClock, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Transition-specific payload for `start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartFields {
    /// Justification for starting a `Due` breakdown; ignored otherwise.
    pub recall_reason: Option<String>,
    /// Opening meter reading for a service visit.
    pub meter_reading: Option<i64>,
    /// Advisory on-site flag recorded with a recall start.
    pub on_site: Option<bool>,
}

/// Transition-specific payload for `complete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteFields {
    pub solution_category: String,
    pub solution_text: String,
    /// Closing meter reading for a service visit.
    pub closing_meter_reading: Option<i64>,
}

impl CompleteFields {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            solution_category: category.into(),
            solution_text: text.into(),
            closing_meter_reading: None,
        }
    }
}

/// Failures surfaced to the UI from a submit operation.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Guard failure; user-correctable, shown as a validation message.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Session expired. Also raised on the global auth channel.
    #[error("session expired, please sign in again")]
    Unauthorized,
    /// The job is not in the local working set.
    #[error("unknown job: {0}")]
    UnknownJob(JobKey),
    /// Backend or connectivity failure; the user may retry.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Boundary that submits validated transition intents to the backend.
pub struct ActionGateway<C: Clock = SystemClock> {
    engine: Arc<LifecycleEngine<C>>,
    backend: Arc<dyn Backend>,
    ctx: SessionContext,
    auth: AuthSender,
}

impl<C: Clock> ActionGateway<C> {
    pub fn new(
        engine: Arc<LifecycleEngine<C>>,
        backend: Arc<dyn Backend>,
        ctx: SessionContext,
        auth: AuthSender,
    ) -> Self {
        Self { engine, backend, ctx, auth }
    }

    /// Start a pending job. Applied locally only after the backend
    /// confirms.
    pub async fn submit_start(
        &self,
        key: &JobKey,
        fields: StartFields,
    ) -> Result<(), GatewayError> {
        let lock = self.engine.store().identity_lock(key);
        let _guard = lock.lock_owned().await;

        let job = self.held_job(key)?;
        self.engine.guard_start(&job, &fields)?;

        let confirmation = match key.kind {
            JobKind::Breakdown => {
                self.backend
                    .start_breakdown(&self.ctx, &key.id, fields.recall_reason.as_deref())
                    .await
            }
            JobKind::Service => {
                self.backend.start_service(&self.ctx, &key.id, fields.meter_reading).await
            }
        }
        .map_err(|e| self.escalate(e))?;

        tracing::info!(%key, "start confirmed");
        self.engine.apply_confirmed_start(key, &fields, &confirmation);
        Ok(())
    }

    /// Complete a started job. The category guard runs against the cached
    /// (fetch-once) list; field presence is checked before any network
    /// traffic.
    pub async fn submit_complete(
        &self,
        key: &JobKey,
        fields: CompleteFields,
    ) -> Result<(), GatewayError> {
        let lock = self.engine.store().identity_lock(key);
        let _guard = lock.lock_owned().await;

        let job = self.held_job(key)?;
        if fields.solution_category.is_empty() || fields.solution_text.is_empty() {
            // Cheap check first so an empty form never triggers the
            // category fetch
            return Err(ValidationError::MissingSolution.into());
        }
        let categories = self
            .engine
            .categories()
            .get_or_fetch(self.backend.as_ref(), &self.ctx)
            .await
            .map_err(|e| self.escalate(e))?;
        self.engine.guard_complete(&job, &fields, categories)?;

        let confirmation = match key.kind {
            JobKind::Breakdown => {
                self.backend
                    .complete_breakdown(
                        &self.ctx,
                        &key.id,
                        &fields.solution_category,
                        &fields.solution_text,
                    )
                    .await
            }
            JobKind::Service => {
                self.backend
                    .complete_service(
                        &self.ctx,
                        &key.id,
                        &fields.solution_category,
                        &fields.solution_text,
                        fields.closing_meter_reading,
                    )
                    .await
            }
        }
        .map_err(|e| self.escalate(e))?;

        tracing::info!(%key, review_ref = %confirmation.review_ref, "completion confirmed");
        self.engine.apply_confirmed_complete(key, &fields, &confirmation);
        Ok(())
    }

    /// Record a recall justification on a pending due item. No status
    /// change; the subsequent start consumes the reason.
    pub async fn submit_recall(
        &self,
        key: &JobKey,
        reason: &str,
        on_site: bool,
    ) -> Result<(), GatewayError> {
        let lock = self.engine.store().identity_lock(key);
        let _guard = lock.lock_owned().await;

        let job = self.held_job(key)?;
        self.engine.guard_recall(&job, reason)?;

        self.backend
            .submit_recall(&self.ctx, &key.id, reason, on_site)
            .await
            .map_err(|e| self.escalate(e))?;

        tracing::info!(%key, "recall recorded");
        let patch = fw_core::JobPatch::default().recall_reason(reason).on_site(on_site);
        self.engine.store().apply_patch(key, &patch);
        Ok(())
    }

    fn held_job(&self, key: &JobKey) -> Result<Job, GatewayError> {
        self.engine
            .store()
            .get(key)
            .ok_or_else(|| GatewayError::UnknownJob(key.clone()))
    }

    /// Translate a backend failure, routing `Unauthorized` to the single
    /// global handler.
    fn escalate(&self, err: BackendError) -> GatewayError {
        match err {
            BackendError::Unauthorized => {
                self.auth.unauthorized();
                GatewayError::Unauthorized
            }
            other => GatewayError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
