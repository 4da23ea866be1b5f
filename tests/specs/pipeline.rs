// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frames → normalizer → engine → store, end to end.

use crate::specs::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn assigned_frame_lands_in_the_store_as_pending() {
    let mut stack = Stack::new();
    stack.push(&breakdown_assigned_frame("208299", "Assign", 1)).await;

    let key = JobKey::breakdown("208299");
    let job = stack.store().get(&key).expect("job in store");
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.customer_name, "Harbor Mills");
    assert_eq!(job.machine_ref, "MCH-0774");
}

#[tokio::test]
async fn duplicate_delivery_is_applied_at_most_once() {
    let mut stack = Stack::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_listener = hits.clone();
    stack.store().subscribe(move |_| {
        hits_in_listener.fetch_add(1, Ordering::SeqCst);
    });

    let frame = breakdown_assigned_frame("208299", "Assign", 1);
    stack.push(&frame).await;
    stack.push(&frame).await;
    stack.push(&frame).await;

    assert_eq!(stack.store().len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(stack.normalizer.stats().duplicates, 2);
}

#[tokio::test]
async fn assigned_then_identical_status_notifies_once() {
    // Spec scenario: Assigned for an unknown identity creates a pending
    // job; a subsequent StatusChanged to pending (identical) is ignored
    // and fires no second notification
    let mut stack = Stack::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_listener = hits.clone();
    stack.store().subscribe(move |_| {
        hits_in_listener.fetch_add(1, Ordering::SeqCst);
    });

    stack.push(&breakdown_assigned_frame("208299", "Assign", 1)).await;
    stack.push(&breakdown_status_frame("208299", "PENDING", 2)).await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let key = JobKey::breakdown("208299");
    assert_eq!(stack.store().get(&key).map(|j| j.status), Some(JobStatus::Pending));
}

#[tokio::test]
async fn push_status_walks_the_job_forward() {
    let mut stack = Stack::new();
    stack.push(&service_assigned_frame("41001", 1)).await;
    stack.push(&service_status_frame("41001", "STARTED", 2)).await;

    let key = JobKey::service("41001");
    let job = stack.store().get(&key).expect("job");
    assert_eq!(job.status, JobStatus::Started);
    assert_eq!(job.started_at_ms, Some(2));

    stack.push(&service_status_frame("41001", "COMPLETED", 3)).await;
    let job = stack.store().get(&key).expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.completed_at_ms, Some(3));
}

#[tokio::test]
async fn regressive_push_status_is_ignored() {
    let mut stack = Stack::new();
    stack.push(&service_assigned_frame("41001", 1)).await;
    stack.push(&service_status_frame("41001", "COMPLETED", 2)).await;
    stack.push(&service_status_frame("41001", "STARTED", 3)).await;

    let key = JobKey::service("41001");
    assert_eq!(stack.store().get(&key).map(|j| j.status), Some(JobStatus::Completed));
}

#[tokio::test]
async fn cancellation_arrives_via_push_only() {
    let mut stack = Stack::new();
    stack.push(&breakdown_assigned_frame("7", "Assign", 1)).await;
    stack.push(&breakdown_cancelled_frame("7", 2)).await;

    let key = JobKey::breakdown("7");
    assert_eq!(stack.store().get(&key).map(|j| j.status), Some(JobStatus::Cancelled));
}

#[tokio::test]
async fn malformed_frames_are_counted_not_fatal() {
    let mut stack = Stack::new();
    stack.push("garbage").await;
    stack.push(&breakdown_assigned_frame("208299", "Assign", 1)).await;

    assert_eq!(stack.normalizer.stats().malformed, 1);
    assert_eq!(stack.store().len(), 1);
}

#[tokio::test]
async fn due_job_from_push_requires_recall_reason_to_start() {
    let mut stack = Stack::new();
    stack.push(&breakdown_assigned_frame("9001", "Due", 1)).await;

    let key = JobKey::breakdown("9001");
    let err = stack
        .gateway
        .submit_start(&key, fw_engine::StartFields::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        fw_engine::GatewayError::Validation(fw_core::ValidationError::MissingRecallReason)
    ));

    // Recall then start: reason recorded, start accepted
    stack.gateway.submit_recall(&key, "machine down again", false).await.expect("recall");
    stack
        .gateway
        .submit_start(&key, fw_engine::StartFields::default())
        .await
        .expect("start after recall");
    assert_eq!(stack.store().get(&key).map(|j| j.status), Some(JobStatus::Started));
}

#[tokio::test]
async fn full_lifecycle_push_and_action_mixed() {
    // Assigned by push, started by technician, completed by technician,
    // with a late duplicate status push that must not regress anything
    let mut stack = Stack::new();
    stack.push(&breakdown_assigned_frame("208299", "Assign", 1)).await;

    let key = JobKey::breakdown("208299");
    stack.gateway.submit_start(&key, fw_engine::StartFields::default()).await.expect("start");
    stack
        .gateway
        .submit_complete(&key, fw_engine::CompleteFields::new("Electrical", "replaced fuse"))
        .await
        .expect("complete");

    // Late push echoing the earlier start
    stack.push(&breakdown_status_frame("208299", "STARTED", 9)).await;

    let job = stack.store().get(&key).expect("job");
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.solution_category, "Electrical");
}
