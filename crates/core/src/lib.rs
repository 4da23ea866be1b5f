// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fw-core: Domain model for the fieldwork job lifecycle core

pub mod macros;

pub mod clock;
pub mod errors;
pub mod event;
pub mod id;
pub mod job;
pub mod patch;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use errors::{ActionKind, ValidationError};
pub use event::{DedupeKey, JobEvent, JobEventBody};
pub use id::short;
pub use job::{
    Agreement, Assignment, BreakdownDetail, Job, JobDetail, JobId, JobKey, JobKind, JobStatus,
    ServiceDetail,
};
pub use patch::JobPatch;
pub use session::{auth_channel, AuthReceiver, AuthSender, AuthSignal, SessionContext, TechCode};
#[cfg(any(test, feature = "test-support"))]
pub use test_support::{BreakdownJobBuilder, ServiceJobBuilder};
