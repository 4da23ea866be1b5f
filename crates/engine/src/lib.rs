// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fw-engine: the sole authority for job-state transitions.
//!
//! The lifecycle engine validates and applies every transition, whether it
//! came from a technician action (via the action gateway, applied only on
//! backend confirmation) or from an inbound push event. All writes go
//! through the store's serialized per-identity mutation path.

mod categories;
mod gateway;
mod lifecycle;

pub use categories::SolutionCategories;
pub use gateway::{ActionGateway, CompleteFields, GatewayError, StartFields};
pub use lifecycle::{LifecycleEngine, METER_READING_UNSET};
