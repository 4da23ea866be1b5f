// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory [`Backend`] for tests.

use super::{Backend, BackendError, CompleteConfirmation, StartConfirmation};
use async_trait::async_trait;
use fw_core::{JobId, SessionContext};
use parking_lot::Mutex;
use std::time::Duration;

/// One recorded backend call, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    StartBreakdown { job_id: JobId, recall_reason: Option<String> },
    CompleteBreakdown { job_id: JobId, category: String, text: String },
    StartService { job_id: JobId, meter_reading: Option<i64> },
    CompleteService { job_id: JobId, category: String, text: String },
    SubmitRecall { job_id: JobId, reason: String, on_site: bool },
    SolutionCategories,
}

/// Backend double: records calls, answers with fixed confirmations.
///
/// `fail_next` scripts one failure; `delay` stalls every transition call,
/// which ordering tests use to hold an identity's queue open.
pub struct FakeBackend {
    calls: Mutex<Vec<FakeCall>>,
    categories: Mutex<Vec<String>>,
    fail_next: Mutex<Option<BackendError>>,
    delay: Mutex<Option<Duration>>,
    pub started_at_ms: u64,
    pub completed_at_ms: u64,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            categories: Mutex::new(vec!["Electrical".into(), "Mechanical".into()]),
            fail_next: Mutex::new(None),
            delay: Mutex::new(None),
            started_at_ms: 1_700_000,
            completed_at_ms: 1_700_500,
        }
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: Vec<String>) -> Self {
        let backend = Self::default();
        *backend.categories.lock() = categories;
        backend
    }

    /// Script the next call to fail with `err`.
    pub fn fail_next(&self, err: BackendError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Stall every transition call by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().clone()
    }

    async fn before_call(&self, call: FakeCall) -> Result<(), BackendError> {
        self.calls.lock().push(call);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.fail_next.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn start_breakdown(
        &self,
        _ctx: &SessionContext,
        job_id: &JobId,
        recall_reason: Option<&str>,
    ) -> Result<StartConfirmation, BackendError> {
        self.before_call(FakeCall::StartBreakdown {
            job_id: job_id.clone(),
            recall_reason: recall_reason.map(str::to_string),
        })
        .await?;
        Ok(StartConfirmation { started_at_ms: self.started_at_ms, meter_reading: None })
    }

    async fn complete_breakdown(
        &self,
        _ctx: &SessionContext,
        job_id: &JobId,
        solution_category: &str,
        solution_text: &str,
    ) -> Result<CompleteConfirmation, BackendError> {
        self.before_call(FakeCall::CompleteBreakdown {
            job_id: job_id.clone(),
            category: solution_category.to_string(),
            text: solution_text.to_string(),
        })
        .await?;
        Ok(CompleteConfirmation {
            completed_at_ms: self.completed_at_ms,
            review_ref: format!("rev-{job_id}"),
        })
    }

    async fn start_service(
        &self,
        _ctx: &SessionContext,
        job_id: &JobId,
        meter_reading: Option<i64>,
    ) -> Result<StartConfirmation, BackendError> {
        self.before_call(FakeCall::StartService { job_id: job_id.clone(), meter_reading })
            .await?;
        Ok(StartConfirmation { started_at_ms: self.started_at_ms, meter_reading })
    }

    async fn complete_service(
        &self,
        _ctx: &SessionContext,
        job_id: &JobId,
        solution_category: &str,
        solution_text: &str,
        _closing_meter_reading: Option<i64>,
    ) -> Result<CompleteConfirmation, BackendError> {
        self.before_call(FakeCall::CompleteService {
            job_id: job_id.clone(),
            category: solution_category.to_string(),
            text: solution_text.to_string(),
        })
        .await?;
        Ok(CompleteConfirmation {
            completed_at_ms: self.completed_at_ms,
            review_ref: format!("rev-{job_id}"),
        })
    }

    async fn submit_recall(
        &self,
        _ctx: &SessionContext,
        job_id: &JobId,
        reason: &str,
        on_site: bool,
    ) -> Result<(), BackendError> {
        self.before_call(FakeCall::SubmitRecall {
            job_id: job_id.clone(),
            reason: reason.to_string(),
            on_site,
        })
        .await
    }

    async fn solution_categories(
        &self,
        _ctx: &SessionContext,
    ) -> Result<Vec<String>, BackendError> {
        self.before_call(FakeCall::SolutionCategories).await?;
        Ok(self.categories.lock().clone())
    }
}
