// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame-to-event normalization and de-duplication.

use crate::dedupe::DedupeWindow;
use crate::frame::{self, EventTag};
use fw_core::{JobEvent, JobEventBody, JobKey};
use serde::Serialize;
use serde_json::Value;

/// Retention window for recently seen dedupe keys.
pub const DEDUPE_CAPACITY: usize = 500;

/// Counters for frames that produced no event. Observability only; the
/// normalizer never fails.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizerStats {
    /// Events handed to the engine.
    pub emitted: u64,
    /// Frames dropped by the dedupe window.
    pub duplicates: u64,
    /// Frames that were not JSON objects.
    pub malformed: u64,
    /// JSON objects of no known shape (kind, event type, or id missing).
    pub unrecognized: u64,
}

/// Stateful normalizer: one per transport session.
///
/// Owns the dedupe window; everything else is a pure function of the frame.
#[derive(Debug)]
pub struct Normalizer {
    dedupe: DedupeWindow,
    stats: NormalizerStats,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_capacity(DEDUPE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { dedupe: DedupeWindow::new(capacity), stats: NormalizerStats::default() }
    }

    /// Normalize one raw text frame into zero or one [`JobEvent`].
    ///
    /// Never errors: anything unusable increments a counter and returns
    /// `None`.
    pub fn ingest(&mut self, raw: &str) -> Option<JobEvent> {
        let frame: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => {
                self.stats.malformed += 1;
                tracing::debug!(len = raw.len(), "normalizer: non-JSON frame dropped");
                return None;
            }
        };
        if !frame.is_object() {
            self.stats.malformed += 1;
            tracing::debug!("normalizer: non-object frame dropped");
            return None;
        }

        let Some(kind) = frame::detect_kind(&frame) else {
            self.stats.unrecognized += 1;
            tracing::debug!("normalizer: frame of unknown kind dropped");
            return None;
        };
        let Some(tag) = frame::event_tag(&frame) else {
            self.stats.unrecognized += 1;
            tracing::debug!(%kind, "normalizer: frame with unknown event type dropped");
            return None;
        };
        let id = frame::job_id(&frame);
        if id.is_empty() {
            self.stats.unrecognized += 1;
            tracing::debug!(%kind, "normalizer: frame without job id dropped");
            return None;
        }

        let body = match tag {
            EventTag::Assigned => {
                JobEventBody::Assigned { job: Box::new(frame::job(kind, &frame)) }
            }
            EventTag::StatusChanged => JobEventBody::StatusChanged { status: frame::status(&frame) },
            EventTag::Cancelled => JobEventBody::Cancelled,
        };
        let event = JobEvent::new(JobKey::new(kind, id), body, frame::server_ts_ms(&frame));

        if !self.dedupe.insert(event.dedupe_key()) {
            self.stats.duplicates += 1;
            tracing::debug!(key = %event.key, "normalizer: duplicate delivery dropped");
            return None;
        }

        self.stats.emitted += 1;
        Some(event)
    }

    pub fn stats(&self) -> &NormalizerStats {
        &self.stats
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
