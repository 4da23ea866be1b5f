// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation error taxonomy for lifecycle transitions.

use crate::job::JobStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Technician-initiated transition being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Start,
    Complete,
    Recall,
}

crate::simple_display! {
    ActionKind {
        Start => "start",
        Complete => "complete",
        Recall => "recall",
    }
}

/// Guard failures surfaced to the UI as typed values.
///
/// These are user-correctable validation outcomes, not system errors:
/// callers block the action and re-prompt, they never retry automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ValidationError {
    /// Starting a `Due` breakdown without a recall reason.
    #[error("recall reason is required before starting a due job")]
    MissingRecallReason,

    /// Completing without a solution category or solution text.
    #[error("solution category and text are required to complete")]
    MissingSolution,

    /// Solution category not in the backend-provided list.
    #[error("unknown solution category: {category}")]
    InvalidCategory { category: String },

    /// Action not legal from the job's current status.
    #[error("cannot {action} a {from} job")]
    InvalidTransition { from: JobStatus, action: ActionKind },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
