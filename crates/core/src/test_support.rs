// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test fixtures shared across the workspace's test suites.
//!
//! Builders produce fully-populated jobs with plausible defaults so tests
//! only spell out the fields they are about.

use crate::job::{
    Agreement, Assignment, BreakdownDetail, Job, JobDetail, JobId, JobStatus, ServiceDetail,
};

/// Builder for a service-visit [`Job`].
pub struct ServiceJobBuilder {
    id: JobId,
    status: JobStatus,
    machine_ref: String,
    customer_name: String,
    location: String,
    expected_visit_no: u32,
    days_left: i32,
    meter_reading: Option<i64>,
}

impl Default for ServiceJobBuilder {
    fn default() -> Self {
        Self {
            id: JobId::from_string("41001"),
            status: JobStatus::Pending,
            machine_ref: "MCH-1180".into(),
            customer_name: "Acme Beverages".into(),
            location: "Plant 2".into(),
            expected_visit_no: 3,
            days_left: 4,
            meter_reading: None,
        }
    }
}

impl ServiceJobBuilder {
    crate::setters! {
        into {
            id: JobId,
            machine_ref: String,
            customer_name: String,
            location: String,
        }
        set {
            status: JobStatus,
            expected_visit_no: u32,
            days_left: i32,
        }
        option {
            meter_reading: i64,
        }
    }

    pub fn build(self) -> Job {
        Job {
            id: self.id,
            status: self.status,
            machine_ref: self.machine_ref,
            customer_name: self.customer_name,
            location: self.location,
            phone_number: "555-0142".into(),
            date: "2026-02-11".into(),
            started_at_ms: None,
            completed_at_ms: None,
            solution_category: String::new(),
            solution_text: String::new(),
            detail: JobDetail::Service(ServiceDetail {
                expected_visit_no: self.expected_visit_no,
                days_left: self.days_left,
                meter_reading: self.meter_reading,
                closing_meter_reading: None,
            }),
        }
    }
}

/// Builder for a breakdown [`Job`].
pub struct BreakdownJobBuilder {
    id: JobId,
    status: JobStatus,
    machine_ref: String,
    customer_name: String,
    serial_no: String,
    agreement: Agreement,
    assignment: Assignment,
    recall_reason: String,
    on_site: bool,
}

impl Default for BreakdownJobBuilder {
    fn default() -> Self {
        Self {
            id: JobId::from_string("208299"),
            status: JobStatus::Pending,
            machine_ref: "MCH-0774".into(),
            customer_name: "Harbor Mills".into(),
            serial_no: "SN-99417".into(),
            agreement: Agreement::Paid,
            assignment: Assignment::Assign,
            recall_reason: String::new(),
            on_site: false,
        }
    }
}

impl BreakdownJobBuilder {
    crate::setters! {
        into {
            id: JobId,
            machine_ref: String,
            customer_name: String,
            serial_no: String,
            recall_reason: String,
        }
        set {
            status: JobStatus,
            agreement: Agreement,
            assignment: Assignment,
            on_site: bool,
        }
    }

    pub fn build(self) -> Job {
        Job {
            id: self.id,
            status: self.status,
            machine_ref: self.machine_ref,
            customer_name: self.customer_name,
            location: "Dockside".into(),
            phone_number: "555-0171".into(),
            date: "2026-02-09".into(),
            started_at_ms: None,
            completed_at_ms: None,
            solution_category: String::new(),
            solution_text: String::new(),
            detail: JobDetail::Breakdown(BreakdownDetail {
                serial_no: self.serial_no,
                agreement: self.agreement,
                assignment: self.assignment,
                recall_reason: self.recall_reason,
                on_site: self.on_site,
            }),
        }
    }
}

impl Job {
    /// Builder for a pending service visit with test defaults.
    pub fn service_builder() -> ServiceJobBuilder {
        ServiceJobBuilder::default()
    }

    /// Builder for a pending breakdown with test defaults.
    pub fn breakdown_builder() -> BreakdownJobBuilder {
        BreakdownJobBuilder::default()
    }
}

pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_job_kind() -> impl Strategy<Value = crate::job::JobKind> {
        prop_oneof![
            Just(crate::job::JobKind::Service),
            Just(crate::job::JobKind::Breakdown),
        ]
    }

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Pending),
            Just(JobStatus::Started),
            Just(JobStatus::Completed),
            Just(JobStatus::Cancelled),
        ]
    }

    pub fn arb_agreement() -> impl Strategy<Value = Agreement> {
        prop_oneof![
            Just(Agreement::Warranty),
            Just(Agreement::FreeService),
            Just(Agreement::Paid),
        ]
    }

    pub fn arb_assignment() -> impl Strategy<Value = Assignment> {
        prop_oneof![Just(Assignment::Assign), Just(Assignment::Due)]
    }
}
