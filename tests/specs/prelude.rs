// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the integration specs.

use fw_adapters::FakeBackend;
use fw_core::{auth_channel, AuthReceiver, SessionContext};
use fw_engine::{ActionGateway, LifecycleEngine};
use fw_store::JobStore;
use fw_wire::Normalizer;
use std::sync::Arc;

pub use fw_core::{JobEventBody, JobKey, JobStatus};

/// The full client-side stack minus the socket: normalizer, engine, store,
/// gateway over a fake backend.
pub struct Stack {
    pub normalizer: Normalizer,
    pub engine: Arc<LifecycleEngine>,
    pub gateway: ActionGateway,
    pub backend: Arc<FakeBackend>,
    pub auth_rx: AuthReceiver,
}

impl Stack {
    pub fn new() -> Self {
        let engine = Arc::new(LifecycleEngine::new(Arc::new(JobStore::new())));
        let backend = Arc::new(FakeBackend::new());
        let (auth_tx, auth_rx) = auth_channel();
        let gateway = ActionGateway::new(
            engine.clone(),
            backend.clone(),
            SessionContext::new("T-1180", "token"),
            auth_tx,
        );
        Self { normalizer: Normalizer::new(), engine, gateway, backend, auth_rx }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        self.engine.store()
    }

    /// Push one raw frame through normalizer and engine, as the transport's
    /// frame handler does in production.
    pub async fn push(&mut self, raw: &str) {
        if let Some(event) = self.normalizer.ingest(raw) {
            self.engine.apply_event(event).await;
        }
    }
}

/// A breakdown `Assigned` frame in the backend's wire shape (note the
/// casing; it is the backend's, not ours).
pub fn breakdown_assigned_frame(job_id: &str, job_type: &str, ts: u64) -> String {
    serde_json::json!({
        "evenT_TYPE": "ASSIGNED",
        "joB_ID": job_id,
        "machinE_REF_NO": "MCH-0774",
        "teaM_CODE": "T-9",
        "customeR_NAME": "Harbor Mills",
        "locatioN": "Dockside",
        "phonE_NO": "555-0171",
        "joB_DATE": "2026-02-09",
        "seriaL_NO": "SN-99417",
        "agreemenT_TYPE": "PAID",
        "joB_TYPE": job_type,
        "joB_STATUS": "PENDING",
        "serveR_TS": ts,
    })
    .to_string()
}

/// A service `Assigned` frame in the backend's wire shape.
pub fn service_assigned_frame(job_id: &str, ts: u64) -> String {
    serde_json::json!({
        "evenT_TYPE": "ASSIGNED",
        "joB_ID": job_id,
        "machinE_REF": "MCH-1180",
        "expecteD_VISIT_NO": 3,
        "dayS_LEFT": -2,
        "customeR_NAME": "Acme Beverages",
        "visiT_DATE": "2026-02-11",
        "serveR_TS": ts,
    })
    .to_string()
}

pub fn breakdown_status_frame(job_id: &str, status: &str, ts: u64) -> String {
    serde_json::json!({
        "evenT_TYPE": "STATUS",
        "joB_ID": job_id,
        "machinE_REF_NO": "MCH-0774",
        "joB_STATUS": status,
        "serveR_TS": ts,
    })
    .to_string()
}

pub fn service_status_frame(job_id: &str, status: &str, ts: u64) -> String {
    serde_json::json!({
        "evenT_TYPE": "STATUS",
        "joB_ID": job_id,
        "expecteD_VISIT_NO": 3,
        "joB_STATUS": status,
        "serveR_TS": ts,
    })
    .to_string()
}

pub fn breakdown_cancelled_frame(job_id: &str, ts: u64) -> String {
    serde_json::json!({
        "evenT_TYPE": "CANCELLED",
        "joB_ID": job_id,
        "machinE_REF_NO": "MCH-0774",
        "serveR_TS": ts,
    })
    .to_string()
}
