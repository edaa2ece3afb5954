//! Errors raised by the airdrop state machine

use super::{GateStatus, TaskId};

/// Error type for task tracking and claim gating
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AirdropError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Claim not allowed: {status}")]
    IneligibleClaim { status: GateStatus },

    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),

    #[error("Task set is empty")]
    EmptyTaskSet,
}
