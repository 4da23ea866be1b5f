// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partial job updates.
//!
//! Incremental writers (confirmed gateway actions, status-change events) go
//! through [`JobPatch`] + merge; only the bulk-refresh path replaces whole
//! jobs.

use crate::job::{Job, JobDetail, JobStatus};
use serde::{Deserialize, Serialize};

/// Partial update merged into an existing job by the store.
///
/// Unset fields leave the job untouched. Kind-specific fields are ignored
/// when the target job is of the other kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_reading: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_meter_reading: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_site: Option<bool>,
}

impl JobPatch {
    /// Patch carrying only a status change.
    pub fn status(status: JobStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    crate::setters! {
        option {
            started_at_ms: u64,
            completed_at_ms: u64,
            meter_reading: i64,
            closing_meter_reading: i64,
            solution_category: String,
            solution_text: String,
            recall_reason: String,
            on_site: bool,
        }
    }
}

impl Job {
    /// Merge `patch` into this job. Returns true when any field changed.
    ///
    /// Idempotent: merging the same patch twice leaves the job as after the
    /// first merge and reports no change.
    pub fn merge_patch(&mut self, patch: &JobPatch) -> bool {
        let mut changed = false;

        if let Some(status) = patch.status {
            changed |= set(&mut self.status, status);
        }
        if let Some(ms) = patch.started_at_ms {
            changed |= set(&mut self.started_at_ms, Some(ms));
        }
        if let Some(ms) = patch.completed_at_ms {
            changed |= set(&mut self.completed_at_ms, Some(ms));
        }
        if let Some(ref cat) = patch.solution_category {
            changed |= set(&mut self.solution_category, cat.clone());
        }
        if let Some(ref text) = patch.solution_text {
            changed |= set(&mut self.solution_text, text.clone());
        }

        match &mut self.detail {
            JobDetail::Service(d) => {
                if let Some(m) = patch.meter_reading {
                    changed |= set(&mut d.meter_reading, Some(m));
                }
                if let Some(m) = patch.closing_meter_reading {
                    changed |= set(&mut d.closing_meter_reading, Some(m));
                }
            }
            JobDetail::Breakdown(d) => {
                if let Some(ref reason) = patch.recall_reason {
                    changed |= set(&mut d.recall_reason, reason.clone());
                }
                if let Some(on_site) = patch.on_site {
                    changed |= set(&mut d.on_site, on_site);
                }
            }
        }

        changed
    }
}

fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
