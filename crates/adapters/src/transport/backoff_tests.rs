// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    first  = { 0, 0 },
    second = { 1, 2 },
    third  = { 2, 5 },
    fourth = { 3, 10 },
    fifth  = { 4, 30 },
)]
fn schedule_steps(attempt: usize, secs: u64) {
    assert_eq!(delay(attempt), Duration::from_secs(secs));
}

#[test]
fn final_interval_repeats_indefinitely() {
    assert_eq!(delay(5), Duration::from_secs(30));
    assert_eq!(delay(100), Duration::from_secs(30));
    assert_eq!(delay(usize::MAX), Duration::from_secs(30));
}
