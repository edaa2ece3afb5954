//! Task verifiers - decide whether a participant really completed a task
//!
//! The airdrop session never assumes completion on its own; it applies the
//! [`TaskVerificationResult`] a verifier produces. Real integrations (social
//! network APIs) plug in behind [`TaskVerifier`].

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Task, TaskId, TaskVerificationResult};

#[async_trait]
pub trait TaskVerifier: Send + Sync {
    /// Check `task` for the participant identified by `wallet`
    async fn verify(&self, wallet: &str, task: &Task) -> Result<TaskVerificationResult>;
}

/// Approves every task after a fixed delay.
///
/// This is the honor-system behaviour of the landing page: the visit itself
/// counts, the delay only stands in for an external check.
pub struct DelayedVerifier {
    delay: Duration,
}

impl DelayedVerifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TaskVerifier for DelayedVerifier {
    async fn verify(&self, _wallet: &str, task: &Task) -> Result<TaskVerificationResult> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(TaskVerificationResult::approved(task.id.clone()))
    }
}

/// Approves only a fixed allow-list of task ids
pub struct StaticVerifier {
    approved: HashSet<TaskId>,
}

impl StaticVerifier {
    pub fn approving(ids: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            approved: ids.into_iter().collect(),
        }
    }

    pub fn rejecting_all() -> Self {
        Self {
            approved: HashSet::new(),
        }
    }
}

#[async_trait]
impl TaskVerifier for StaticVerifier {
    async fn verify(&self, _wallet: &str, task: &Task) -> Result<TaskVerificationResult> {
        if self.approved.contains(&task.id) {
            Ok(TaskVerificationResult::approved(task.id.clone()))
        } else {
            Ok(TaskVerificationResult::rejected(task.id.clone()))
        }
    }
}
