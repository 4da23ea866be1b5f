// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-identity ordering under interleaved writers.

use crate::specs::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn push_event_queues_behind_in_flight_action() {
    // The gateway holds the identity lock across its backend round trip; a
    // push event for the same identity applies strictly afterwards
    let mut stack = Stack::new();
    stack.backend.set_delay(Duration::from_millis(50));
    stack.push(&breakdown_assigned_frame("208299", "Assign", 1)).await;
    let key = JobKey::breakdown("208299");

    let engine = stack.engine.clone();
    let gateway = Arc::new(stack.gateway);
    let start = {
        let gateway = gateway.clone();
        let key = key.clone();
        tokio::spawn(async move { gateway.submit_start(&key, fw_engine::StartFields::default()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // While the start is in flight, a completed status pushes in; it must
    // wait for the confirmed start and then apply as a forward step
    let push = {
        let key = key.clone();
        tokio::spawn(async move {
            engine
                .apply_event(fw_core::JobEvent::new(
                    key,
                    JobEventBody::StatusChanged { status: JobStatus::Completed },
                    99,
                ))
                .await;
        })
    };

    start.await.unwrap().expect("start");
    push.await.unwrap();

    let job = stack.engine.store().get(&key).expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    // Both writes landed, in order: start stamped first, then completion
    assert!(job.started_at_ms.is_some());
    assert_eq!(job.completed_at_ms, Some(99));
}

#[tokio::test]
async fn distinct_identities_interleave_freely() {
    let mut stack = Stack::new();
    stack.push(&breakdown_assigned_frame("1", "Assign", 1)).await;
    stack.push(&service_assigned_frame("2", 1)).await;

    // A slow action on one identity does not block events for another
    stack.backend.set_delay(Duration::from_millis(100));
    let breakdown = JobKey::breakdown("1");
    let service = JobKey::service("2");

    let engine = stack.engine.clone();
    let gateway = Arc::new(stack.gateway);
    let slow_start = {
        let gateway = gateway.clone();
        let key = breakdown.clone();
        tokio::spawn(async move { gateway.submit_start(&key, fw_engine::StartFields::default()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    engine
        .apply_event(fw_core::JobEvent::new(
            service.clone(),
            JobEventBody::StatusChanged { status: JobStatus::Started },
            5,
        ))
        .await;

    // The service job advanced while the breakdown start was still in flight
    assert_eq!(engine.store().get(&service).map(|j| j.status), Some(JobStatus::Started));
    assert_eq!(engine.store().get(&breakdown).map(|j| j.status), Some(JobStatus::Pending));

    slow_start.await.unwrap().expect("start");
    assert_eq!(engine.store().get(&breakdown).map(|j| j.status), Some(JobStatus::Started));
}

#[tokio::test]
async fn events_for_one_identity_apply_in_receipt_order() {
    let mut stack = Stack::new();
    stack.push(&breakdown_assigned_frame("5", "Assign", 1)).await;
    stack.push(&breakdown_status_frame("5", "STARTED", 2)).await;
    stack.push(&breakdown_status_frame("5", "COMPLETED", 3)).await;
    // A late regressive echo changes nothing
    stack.push(&breakdown_status_frame("5", "STARTED", 4)).await;

    let job = stack.store().get(&JobKey::breakdown("5")).expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.started_at_ms, Some(2));
    assert_eq!(job.completed_at_ms, Some(3));
}
