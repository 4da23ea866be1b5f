// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw push-frame field mapping.
//!
//! The backend's push payloads use inconsistent field casing across job
//! kinds (`machinE_REF_NO` on breakdown frames, `expecteD_VISIT_NO` on
//! service frames, and so on). Every known alias lives in the tables below;
//! no raw field name leaks past this crate. Absent fields fall back to a
//! documented default: empty string for text, 0 for numbers, `Pending` for
//! status.

use fw_core::{
    Agreement, Assignment, BreakdownDetail, Job, JobDetail, JobId, JobKind, JobStatus,
    ServiceDetail,
};
use serde_json::Value;

// Shared fields
const JOB_ID: &[&str] = &["joB_ID", "job_ID", "jobId", "job_id"];
const JOB_STATUS: &[&str] = &["joB_STATUS", "job_STATUS", "status"];
const EVENT_TYPE: &[&str] = &["evenT_TYPE", "event_TYPE", "event"];
const SERVER_TS: &[&str] = &["serveR_TS", "server_TS", "timestamp"];
const CUSTOMER_NAME: &[&str] = &["customeR_NAME", "customer_NAME", "customerName"];
const LOCATION: &[&str] = &["locatioN", "location", "siteLocation"];
const PHONE_NO: &[&str] = &["phonE_NO", "phone_NO", "phoneNumber"];
const JOB_DATE: &[&str] = &["joB_DATE", "visiT_DATE", "job_DATE", "date"];

// Breakdown-only fields. `machinE_REF_NO` and the team fields identify the
// frame as a breakdown.
const MACHINE_REF_NO: &[&str] = &["machinE_REF_NO", "machine_REF_NO", "machineRefNo"];
const TEAM_CODE: &[&str] = &["teaM_CODE", "team_CODE"];
const SERIAL_NO: &[&str] = &["seriaL_NO", "serial_NO", "serialNo"];
const AGREEMENT: &[&str] = &["agreemenT_TYPE", "agreement_TYPE", "customerAgreement"];
const JOB_TYPE: &[&str] = &["joB_TYPE", "job_TYPE", "jobType"];

// Service-only fields. The visit-numbering fields identify the frame as a
// service visit.
const EXPECTED_VISIT_NO: &[&str] = &["expecteD_VISIT_NO", "expected_VISIT_NO", "expectedVisitNo"];
const VISIT_NO: &[&str] = &["visiT_NO", "visit_NO", "visitNo"];
const MACHINE_REF: &[&str] = &["machinE_REF", "machine_REF", "machineRef"];
const DAYS_LEFT: &[&str] = &["dayS_LEFT", "days_LEFT", "daysLeft"];
const METER_READING: &[&str] = &["meteR_READING", "meter_READING", "meterReading"];

/// Inbound event classification before a body is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventTag {
    Assigned,
    StatusChanged,
    Cancelled,
}

/// First value found under any alias.
fn field<'a>(frame: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|name| frame.get(*name))
}

fn has_field(frame: &Value, aliases: &[&str]) -> bool {
    field(frame, aliases).is_some()
}

/// Text field with empty-string default. Numbers are stringified because the
/// backend is inconsistent about quoting ids.
fn text(frame: &Value, aliases: &[&str]) -> String {
    match field(frame, aliases) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Integer field with 0 default; tolerates numeric strings.
fn int(frame: &Value, aliases: &[&str]) -> i64 {
    int_opt(frame, aliases).unwrap_or(0)
}

fn int_opt(frame: &Value, aliases: &[&str]) -> Option<i64> {
    match field(frame, aliases) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Detect the job kind from the frame shape.
///
/// This is a closed mapping, not a heuristic: service frames carry
/// visit-numbering fields, breakdown frames carry `machinE_REF_NO`/team
/// fields. A frame with neither is unrecognized.
pub(crate) fn detect_kind(frame: &Value) -> Option<JobKind> {
    if has_field(frame, EXPECTED_VISIT_NO) || has_field(frame, VISIT_NO) {
        return Some(JobKind::Service);
    }
    if has_field(frame, MACHINE_REF_NO) || has_field(frame, TEAM_CODE) {
        return Some(JobKind::Breakdown);
    }
    None
}

pub(crate) fn job_id(frame: &Value) -> JobId {
    JobId::from_string(text(frame, JOB_ID))
}

pub(crate) fn server_ts_ms(frame: &Value) -> u64 {
    int(frame, SERVER_TS).max(0) as u64
}

/// Classify the frame's event type. Unknown tags are unrecognized, not an
/// error.
pub(crate) fn event_tag(frame: &Value) -> Option<EventTag> {
    let raw = text(frame, EVENT_TYPE);
    match raw.to_ascii_lowercase().as_str() {
        "assigned" | "assign" | "new_job" => Some(EventTag::Assigned),
        "status" | "status_changed" | "statuschanged" => Some(EventTag::StatusChanged),
        "cancelled" | "canceled" | "cancel" => Some(EventTag::Cancelled),
        _ => None,
    }
}

/// Status with `Pending` default for missing or unknown values.
pub(crate) fn status(frame: &Value) -> JobStatus {
    match text(frame, JOB_STATUS).to_ascii_lowercase().as_str() {
        "started" | "in_progress" | "wip" => JobStatus::Started,
        "completed" | "done" => JobStatus::Completed,
        "cancelled" | "canceled" => JobStatus::Cancelled,
        _ => JobStatus::Pending,
    }
}

fn agreement(frame: &Value) -> Agreement {
    match text(frame, AGREEMENT).to_ascii_lowercase().as_str() {
        "warranty" => Agreement::Warranty,
        "free" | "free_service" | "freeservice" => Agreement::FreeService,
        // Paid is the commercial default the backend itself falls back to
        _ => Agreement::Paid,
    }
}

fn assignment(frame: &Value) -> Assignment {
    if text(frame, JOB_TYPE).eq_ignore_ascii_case("due") {
        Assignment::Due
    } else {
        Assignment::Assign
    }
}

/// Map an `Assigned` frame to a full job of the detected kind.
pub(crate) fn job(kind: JobKind, frame: &Value) -> Job {
    let detail = match kind {
        JobKind::Service => JobDetail::Service(ServiceDetail {
            expected_visit_no: int(frame, EXPECTED_VISIT_NO).max(0) as u32,
            days_left: int(frame, DAYS_LEFT) as i32,
            meter_reading: int_opt(frame, METER_READING),
            closing_meter_reading: None,
        }),
        JobKind::Breakdown => JobDetail::Breakdown(BreakdownDetail {
            serial_no: text(frame, SERIAL_NO),
            agreement: agreement(frame),
            assignment: assignment(frame),
            recall_reason: String::new(),
            on_site: false,
        }),
    };

    let machine_ref = match kind {
        JobKind::Service => {
            let named = text(frame, MACHINE_REF);
            if named.is_empty() { text(frame, MACHINE_REF_NO) } else { named }
        }
        JobKind::Breakdown => text(frame, MACHINE_REF_NO),
    };

    Job {
        id: job_id(frame),
        status: status(frame),
        machine_ref,
        customer_name: text(frame, CUSTOMER_NAME),
        location: text(frame, LOCATION),
        phone_number: text(frame, PHONE_NO),
        date: text(frame, JOB_DATE),
        started_at_ms: None,
        completed_at_ms: None,
        solution_category: String::new(),
        solution_text: String::new(),
        detail,
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
