//! Serializable snapshot of a session for API responses and the CLI

use serde::Serialize;

use crate::domain::{AirdropSession, ClaimState, GatePhase, GateStatus, Task, TaskProgress};
use crate::store::ParticipantRecord;

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub wallet: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub tasks: Vec<Task>,
    pub progress: TaskProgress,
    pub total_reward_earned: u64,
    pub phase: GatePhase,
    pub status: GateStatus,
    pub status_message: &'static str,
    pub can_claim: bool,
    pub claim: ClaimState,
    pub claim_reward: u64,
}

impl SessionView {
    pub fn new(record: &ParticipantRecord, session: &AirdropSession) -> Self {
        let status = session.status();
        Self {
            wallet: record.wallet_address.clone(),
            email: record.email.clone(),
            email_verified: session.verification().email_verified,
            tasks: session.tasks().to_vec(),
            progress: session.progress(),
            total_reward_earned: session.total_reward_earned(),
            phase: session.phase(),
            status,
            status_message: status.message(),
            can_claim: session.can_claim(),
            claim: session.claim_state(),
            claim_reward: session.claim_reward(),
        }
    }
}
