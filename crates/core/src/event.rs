// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical realtime job events.
//!
//! Every inbound push frame is normalized into zero or one [`JobEvent`]
//! before it reaches the lifecycle engine. Raw backend field names never
//! cross this boundary.

use crate::job::{Job, JobKey, JobStatus};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Canonical representation of one inbound push notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub key: JobKey,
    #[serde(flatten)]
    pub body: JobEventBody,
    /// Server-side emission timestamp (epoch ms).
    pub server_ts_ms: u64,
}

/// Payload of a [`JobEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEventBody {
    /// A job newly pushed to this technician; carries the full job.
    Assigned { job: Box<Job> },
    /// The backend moved the job to a new status.
    StatusChanged { status: JobStatus },
    /// The backend withdrew the job.
    Cancelled,
}

impl JobEventBody {
    /// Stable tag used in dedupe keys and log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            JobEventBody::Assigned { .. } => "assigned",
            JobEventBody::StatusChanged { .. } => "status_changed",
            JobEventBody::Cancelled => "cancelled",
        }
    }
}

/// Identity of one logical delivery, for at-most-once application.
///
/// Derived from `(key, event tag, server timestamp)`; redelivery of the same
/// logical event produces an equal key and is dropped by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey(SmolStr);

impl DedupeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl JobEvent {
    pub fn new(key: JobKey, body: JobEventBody, server_ts_ms: u64) -> Self {
        Self { key, body, server_ts_ms }
    }

    pub fn dedupe_key(&self) -> DedupeKey {
        DedupeKey(SmolStr::new(format!(
            "{}:{}:{}",
            self.key,
            self.body.tag(),
            self.server_ts_ms
        )))
    }
}

impl std::fmt::Display for DedupeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
