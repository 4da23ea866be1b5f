// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identity, kinds, and the status state machine.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Backend-issued job identifier.
    ///
    /// The backend allocates these; the client never generates one. Kept as a
    /// string because the service and breakdown endpoints disagree on numeric
    /// vs. string encodings.
    pub struct JobId;
}

/// Job kind discriminant. Together with [`JobId`] it forms a [`JobKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Scheduled, recurring maintenance appointment.
    Service,
    /// Unscheduled repair tied to a machine fault.
    Breakdown,
}

crate::simple_display! {
    JobKind {
        Service => "service",
        Breakdown => "breakdown",
    }
}

/// Identity of a job within a technician's working set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub kind: JobKind,
    pub id: JobId,
}

impl JobKey {
    pub fn new(kind: JobKind, id: impl Into<JobId>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn service(id: impl Into<JobId>) -> Self {
        Self::new(JobKind::Service, id)
    }

    pub fn breakdown(id: impl Into<JobId>) -> Self {
        Self::new(JobKind::Breakdown, id)
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Lifecycle status of a job.
///
/// `Pending → Started → Completed` is the only forward rail. `Cancelled` is
/// terminal and reachable from `Pending`/`Started` exclusively via a
/// cancellation event, never a technician action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Started,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Position on the forward rail. `Cancelled` has no rank.
    pub fn rank(self) -> Option<u8> {
        match self {
            JobStatus::Pending => Some(0),
            JobStatus::Started => Some(1),
            JobStatus::Completed => Some(2),
            JobStatus::Cancelled => None,
        }
    }

    /// Check if no further transition may be applied.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// Whether moving to `next` is a strict forward step on the rail.
    ///
    /// Cancellation is excluded here; it has its own reachability rule
    /// (`Pending`/`Started` only) checked at the event site.
    pub fn advances_to(self, next: JobStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Started => "started",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// Customer agreement tier on a breakdown job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    Warranty,
    FreeService,
    Paid,
}

crate::simple_display! {
    Agreement {
        Warranty => "warranty",
        FreeService => "free_service",
        Paid => "paid",
    }
}

/// How a breakdown job reached this technician.
///
/// `Due` marks a recall-eligible overdue instance; starting one requires a
/// recorded recall reason. `Assign` is a fresh assignment with no such guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    Assign,
    Due,
}

crate::simple_display! {
    Assignment {
        Assign => "assign",
        Due => "due",
    }
}

/// Fields specific to a scheduled maintenance visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetail {
    /// Ordinal of the recurring maintenance schedule.
    pub expected_visit_no: u32,
    /// Days until the visit is due; negative means overdue.
    pub days_left: i32,
    /// Meter reading recorded when the visit starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_reading: Option<i64>,
    /// Meter reading recorded on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_meter_reading: Option<i64>,
}

/// Fields specific to an unscheduled breakdown job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownDetail {
    pub serial_no: String,
    pub agreement: Agreement,
    pub assignment: Assignment,
    /// Required before a `Due` item may be started; empty otherwise.
    #[serde(default)]
    pub recall_reason: String,
    /// Advisory flag recorded with a recall; never guards a transition.
    #[serde(default)]
    pub on_site: bool,
}

/// Kind-specific payload of a [`Job`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobDetail {
    Service(ServiceDetail),
    Breakdown(BreakdownDetail),
}

impl JobDetail {
    pub fn kind(&self) -> JobKind {
        match self {
            JobDetail::Service(_) => JobKind::Service,
            JobDetail::Breakdown(_) => JobKind::Breakdown,
        }
    }
}

/// A service visit or breakdown job as held in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub machine_ref: String,
    pub customer_name: String,
    pub location: String,
    pub phone_number: String,
    /// Scheduled date as supplied by the backend; display-only here.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    /// Set on completion; empty until then.
    #[serde(default)]
    pub solution_category: String,
    #[serde(default)]
    pub solution_text: String,
    #[serde(flatten)]
    pub detail: JobDetail,
}

impl Job {
    pub fn kind(&self) -> JobKind {
        self.detail.kind()
    }

    /// Identity of this job in the store.
    pub fn key(&self) -> JobKey {
        JobKey::new(self.kind(), self.id.clone())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn service(&self) -> Option<&ServiceDetail> {
        match &self.detail {
            JobDetail::Service(d) => Some(d),
            JobDetail::Breakdown(_) => None,
        }
    }

    pub fn breakdown(&self) -> Option<&BreakdownDetail> {
        match &self.detail {
            JobDetail::Breakdown(d) => Some(d),
            JobDetail::Service(_) => None,
        }
    }

    /// Check if this is a recall-eligible overdue breakdown still pending
    /// with no reason recorded yet.
    pub fn awaiting_recall_reason(&self) -> bool {
        match &self.detail {
            JobDetail::Breakdown(b) => {
                b.assignment == Assignment::Due
                    && self.status == JobStatus::Pending
                    && b.recall_reason.is_empty()
            }
            JobDetail::Service(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
