// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push-frame normalization.
//!
//! Converts the backend's heterogeneous push payloads into canonical
//! [`fw_core::JobEvent`]s and drops repeated deliveries. Pure transformation,
//! no I/O: malformed input produces no event and a counter increment, never
//! an error.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod dedupe;
mod frame;
mod normalize;

pub use dedupe::DedupeWindow;
pub use normalize::{Normalizer, NormalizerStats, DEDUPE_CAPACITY};
