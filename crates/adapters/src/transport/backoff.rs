// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect backoff schedule.

use std::time::Duration;

/// Delays before successive reconnect attempts. The first retry after a
/// drop is immediate; the final interval repeats indefinitely.
pub const RECONNECT_SCHEDULE: [Duration; 5] = [
    Duration::ZERO,
    Duration::from_secs(2),
    Duration::from_secs(5),
    Duration::from_secs(10),
    Duration::from_secs(30),
];

/// Delay before attempt `attempt` (0-based since the last successful
/// connection).
pub fn delay(attempt: usize) -> Duration {
    let index = attempt.min(RECONNECT_SCHEDULE.len() - 1);
    RECONNECT_SCHEDULE[index]
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
