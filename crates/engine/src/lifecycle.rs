// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition guards and event application.

use crate::categories::SolutionCategories;
use crate::gateway::{CompleteFields, StartFields};
use fw_adapters::{CompleteConfirmation, StartConfirmation};
use fw_core::{
    ActionKind, Assignment, Clock, Job, JobDetail, JobEvent, JobEventBody, JobKey, JobPatch,
    JobStatus, SystemClock, ValidationError,
};
use fw_store::JobStore;
use std::sync::Arc;

/// Sentinel stored when a service visit starts without a meter reading.
pub const METER_READING_UNSET: i64 = -1;

/// Validates and applies every job-state transition.
///
/// Technician actions are guarded here, round-trip through the gateway, and
/// come back as confirmed patches; push events are applied directly. Either
/// way the store's identity lock serializes the write.
pub struct LifecycleEngine<C: Clock = SystemClock> {
    store: Arc<JobStore>,
    categories: SolutionCategories,
    clock: C,
}

impl LifecycleEngine<SystemClock> {
    pub fn new(store: Arc<JobStore>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<C: Clock> LifecycleEngine<C> {
    pub fn with_clock(store: Arc<JobStore>, clock: C) -> Self {
        Self { store, categories: SolutionCategories::new(), clock }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn categories(&self) -> &SolutionCategories {
        &self.categories
    }

    /// Guard a technician `start`.
    ///
    /// A `Due` breakdown needs a recall reason — either submitted with the
    /// action or already recorded on the item via an earlier recall.
    pub fn guard_start(&self, job: &Job, fields: &StartFields) -> Result<(), ValidationError> {
        if job.status != JobStatus::Pending {
            return Err(ValidationError::InvalidTransition {
                from: job.status,
                action: ActionKind::Start,
            });
        }
        if let JobDetail::Breakdown(detail) = &job.detail {
            if detail.assignment == Assignment::Due {
                let submitted = fields.recall_reason.as_deref().unwrap_or("");
                if submitted.is_empty() && detail.recall_reason.is_empty() {
                    return Err(ValidationError::MissingRecallReason);
                }
            }
        }
        Ok(())
    }

    /// Guard a technician `complete` against the fetched category list.
    pub fn guard_complete(
        &self,
        job: &Job,
        fields: &CompleteFields,
        categories: &[String],
    ) -> Result<(), ValidationError> {
        if job.status != JobStatus::Started {
            return Err(ValidationError::InvalidTransition {
                from: job.status,
                action: ActionKind::Complete,
            });
        }
        if fields.solution_category.is_empty() || fields.solution_text.is_empty() {
            return Err(ValidationError::MissingSolution);
        }
        if !categories.iter().any(|c| c == &fields.solution_category) {
            return Err(ValidationError::InvalidCategory {
                category: fields.solution_category.clone(),
            });
        }
        Ok(())
    }

    /// Guard a recall submission: a reason is mandatory and the item must
    /// still be pending.
    pub fn guard_recall(&self, job: &Job, reason: &str) -> Result<(), ValidationError> {
        if reason.trim().is_empty() {
            return Err(ValidationError::MissingRecallReason);
        }
        if job.status != JobStatus::Pending {
            return Err(ValidationError::InvalidTransition {
                from: job.status,
                action: ActionKind::Recall,
            });
        }
        Ok(())
    }

    /// Apply one inbound push event. Serialized per identity; idempotent
    /// for redeliveries that slipped past the dedupe window.
    pub async fn apply_event(&self, event: JobEvent) {
        let lock = self.store.identity_lock(&event.key);
        let _guard = lock.lock_owned().await;
        let JobEvent { key, body, server_ts_ms } = event;

        match body {
            JobEventBody::Assigned { job } => self.apply_assigned(&key, *job),
            JobEventBody::StatusChanged { status } => {
                self.apply_status_changed(&key, status, server_ts_ms)
            }
            JobEventBody::Cancelled => self.apply_cancelled(&key),
        }
    }

    fn apply_assigned(&self, key: &JobKey, mut job: Job) {
        if self.store.contains(key) {
            // Re-assignment of a held job comes through bulk refresh, not
            // push; a stray repeat is ignored.
            tracing::debug!(%key, "assigned event for known identity ignored");
            return;
        }
        // New jobs always enter pending, whatever the frame claimed.
        job.status = JobStatus::Pending;
        job.started_at_ms = None;
        job.completed_at_ms = None;
        tracing::info!(%key, "job assigned");
        self.store.upsert(job);
    }

    fn apply_status_changed(&self, key: &JobKey, status: JobStatus, server_ts_ms: u64) {
        let Some(current) = self.store.get(key) else {
            tracing::debug!(%key, "status change for unknown identity dropped");
            return;
        };
        if status == JobStatus::Cancelled {
            self.apply_cancelled(key);
            return;
        }
        if !current.status.advances_to(status) {
            // Regressive or identical: idempotent ignore, no notification.
            tracing::debug!(%key, from = %current.status, to = %status, "non-forward status ignored");
            return;
        }

        let ts = if server_ts_ms > 0 { server_ts_ms } else { self.clock.epoch_ms() };
        let mut patch = JobPatch::status(status);
        match status {
            JobStatus::Started => patch.started_at_ms = Some(ts),
            JobStatus::Completed => patch.completed_at_ms = Some(ts),
            JobStatus::Pending | JobStatus::Cancelled => {}
        }
        tracing::info!(%key, from = %current.status, to = %status, "status change applied");
        self.store.apply_patch(key, &patch);
    }

    fn apply_cancelled(&self, key: &JobKey) {
        let Some(current) = self.store.get(key) else {
            tracing::debug!(%key, "cancellation for unknown identity dropped");
            return;
        };
        if current.status.is_terminal() {
            tracing::debug!(%key, status = %current.status, "cancellation of terminal job ignored");
            return;
        }
        tracing::info!(%key, "job cancelled");
        self.store.apply_patch(key, &JobPatch::status(JobStatus::Cancelled));
    }

    /// Apply a backend-confirmed start. The caller already holds the
    /// identity lock.
    pub(crate) fn apply_confirmed_start(
        &self,
        key: &JobKey,
        fields: &StartFields,
        confirmation: &StartConfirmation,
    ) {
        let started_at = if confirmation.started_at_ms > 0 {
            confirmation.started_at_ms
        } else {
            self.clock.epoch_ms()
        };
        let mut patch = JobPatch::status(JobStatus::Started).started_at_ms(started_at);
        match key.kind {
            fw_core::JobKind::Service => {
                let reading = confirmation
                    .meter_reading
                    .or(fields.meter_reading)
                    .unwrap_or(METER_READING_UNSET);
                patch = patch.meter_reading(reading);
            }
            fw_core::JobKind::Breakdown => {
                if let Some(reason) = fields.recall_reason.clone() {
                    patch = patch.recall_reason(reason);
                }
                if let Some(on_site) = fields.on_site {
                    patch = patch.on_site(on_site);
                }
            }
        }
        self.store.apply_patch(key, &patch);
    }

    /// Apply a backend-confirmed completion. The caller already holds the
    /// identity lock.
    pub(crate) fn apply_confirmed_complete(
        &self,
        key: &JobKey,
        fields: &CompleteFields,
        confirmation: &CompleteConfirmation,
    ) {
        let completed_at = if confirmation.completed_at_ms > 0 {
            confirmation.completed_at_ms
        } else {
            self.clock.epoch_ms()
        };
        let mut patch = JobPatch::status(JobStatus::Completed)
            .completed_at_ms(completed_at)
            .solution_category(fields.solution_category.clone())
            .solution_text(fields.solution_text.clone());
        if key.kind == fw_core::JobKind::Service {
            if let Some(reading) = fields.closing_meter_reading {
                patch = patch.closing_meter_reading(reading);
            }
        }
        self.store.apply_patch(key, &patch);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
