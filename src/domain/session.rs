//! Airdrop session - one participant's tasks, verification and claim state
//!
//! All transitions go through the methods here. The session owns no I/O:
//! persistence happens at operation boundaries through [`SessionSnapshot`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    can_claim, AirdropError, ClaimReceipt, ClaimState, GatePhase, GateStatus, Task, TaskDefinition,
    TaskId, TaskOpened, TaskProgress, TaskTracker, TaskVerificationResult, VerificationState,
};

/// Persisted form of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub email_verified: bool,
    pub completed_tasks: Vec<TaskId>,
    pub claimed: bool,
    pub claimed_token_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropSession {
    tasks: TaskTracker,
    verification: VerificationState,
    claim: ClaimState,
    claim_reward: u64,
}

impl AirdropSession {
    /// Fresh session: unverified, nothing completed, unclaimed
    pub fn new(
        definitions: impl IntoIterator<Item = TaskDefinition>,
        claim_reward: u64,
    ) -> Result<Self, AirdropError> {
        Ok(Self {
            tasks: TaskTracker::new(definitions)?,
            verification: VerificationState::default(),
            claim: ClaimState::default(),
            claim_reward,
        })
    }

    /// Rebuild a session from a stored snapshot.
    ///
    /// Completed ids that are no longer part of the task set are dropped.
    pub fn restore(
        definitions: impl IntoIterator<Item = TaskDefinition>,
        claim_reward: u64,
        snapshot: &SessionSnapshot,
    ) -> Result<Self, AirdropError> {
        let mut session = Self::new(definitions, claim_reward)?;
        session.verification.email_verified = snapshot.email_verified;
        for id in &snapshot.completed_tasks {
            let result = TaskVerificationResult::approved(id.clone());
            if let Err(AirdropError::TaskNotFound(_)) = session.tasks.apply_verification(&result) {
                warn!("[memedrop:session] Dropping unknown completed task '{}'", id);
            }
        }
        session.claim = ClaimState {
            claimed: snapshot.claimed,
            claimed_token_amount: snapshot.claimed_token_amount,
        };
        Ok(session)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            email_verified: self.verification.email_verified,
            completed_tasks: self.tasks.completed_ids(),
            claimed: self.claim.claimed,
            claimed_token_amount: self.claim.claimed_token_amount,
        }
    }

    // ========================================
    // ACCESSORS
    // ========================================

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn verification(&self) -> VerificationState {
        self.verification
    }

    pub fn claim_state(&self) -> ClaimState {
        self.claim
    }

    pub fn claim_reward(&self) -> u64 {
        self.claim_reward
    }

    pub fn progress(&self) -> TaskProgress {
        self.tasks.progress()
    }

    pub fn total_reward_earned(&self) -> u64 {
        self.tasks.total_reward_earned()
    }

    // ========================================
    // GATE
    // ========================================

    pub fn can_claim(&self) -> bool {
        can_claim(&self.verification, &self.progress(), self.claim.claimed)
    }

    pub fn status(&self) -> GateStatus {
        GateStatus::evaluate(&self.verification, &self.progress(), self.claim.claimed)
    }

    pub fn phase(&self) -> GatePhase {
        GatePhase::evaluate(&self.verification, &self.progress(), self.claim.claimed)
    }

    // ========================================
    // TRANSITIONS
    // ========================================

    /// Record a successful OTP confirmation. Returns false if already verified.
    pub fn verify_email(&mut self) -> bool {
        self.verification.verify()
    }

    pub fn mark_task_opened(&mut self, id: &TaskId) -> Result<TaskOpened, AirdropError> {
        self.tasks.mark_task_opened(id)
    }

    pub fn apply_verification(&mut self, result: &TaskVerificationResult) -> Result<bool, AirdropError> {
        self.tasks.apply_verification(result)
    }

    /// Claim the airdrop. Fails without touching state unless the gate is open.
    pub fn claim(&mut self) -> Result<ClaimReceipt, AirdropError> {
        if !self.can_claim() {
            return Err(AirdropError::IneligibleClaim {
                status: self.status(),
            });
        }
        self.claim = ClaimState {
            claimed: true,
            claimed_token_amount: self.claim_reward,
        };
        Ok(ClaimReceipt {
            amount: self.claim_reward,
            claimed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::sample_definitions;

    fn session() -> AirdropSession {
        AirdropSession::new(sample_definitions(), 500).unwrap()
    }

    fn complete(session: &mut AirdropSession, ids: &[&str]) {
        for id in ids {
            session
                .apply_verification(&TaskVerificationResult::approved(TaskId::from(*id)))
                .unwrap();
        }
    }

    fn complete_all(session: &mut AirdropSession) {
        for def in sample_definitions() {
            session
                .apply_verification(&TaskVerificationResult::approved(def.id))
                .unwrap();
        }
    }

    #[test]
    fn test_fresh_session_asks_for_email() {
        let s = session();
        assert_eq!(s.status(), GateStatus::VerifyEmail);
        assert_eq!(s.status().message(), "verify email");
        assert_eq!(s.phase(), GatePhase::Unverified);
        assert!(!s.can_claim());
    }

    #[test]
    fn test_verified_with_one_task_left() {
        let mut s = session();
        assert!(s.verify_email());
        complete(&mut s, &["follow_x", "join_telegram", "retweet", "join_discord"]);

        assert!(!s.can_claim());
        assert_eq!(s.status().message(), "complete remaining tasks");
        assert_eq!(s.phase(), GatePhase::VerifiedIncomplete);
    }

    #[test]
    fn test_claim_when_eligible() {
        let mut s = session();
        s.verify_email();
        complete_all(&mut s);
        assert_eq!(s.phase(), GatePhase::VerifiedComplete);
        assert!(s.can_claim());

        let receipt = s.claim().unwrap();
        assert_eq!(receipt.amount, 500);
        assert_eq!(s.claim_state().claimed_token_amount, 500);
        assert_eq!(s.phase(), GatePhase::Claimed);
        assert_eq!(s.status(), GateStatus::Claimed);
    }

    #[test]
    fn test_second_claim_is_rejected() {
        let mut s = session();
        s.verify_email();
        complete_all(&mut s);
        s.claim().unwrap();
        let before = s.clone();

        let err = s.claim().unwrap_err();
        assert_eq!(
            err,
            AirdropError::IneligibleClaim {
                status: GateStatus::Claimed
            }
        );
        assert!(!s.can_claim());
        assert_eq!(s, before);
    }

    #[test]
    fn test_claim_before_verification_leaves_state() {
        let mut s = session();
        complete_all(&mut s);
        let before = s.clone();

        let err = s.claim().unwrap_err();
        assert!(matches!(
            err,
            AirdropError::IneligibleClaim {
                status: GateStatus::VerifyEmail
            }
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn test_completing_tasks_before_verification() {
        let mut s = session();
        complete_all(&mut s);
        assert_eq!(s.phase(), GatePhase::Unverified);

        s.verify_email();
        assert!(!s.verify_email());
        assert_eq!(s.phase(), GatePhase::VerifiedComplete);
    }

    #[test]
    fn test_total_reward_of_full_set() {
        let mut s = session();
        complete_all(&mut s);
        assert_eq!(s.total_reward_earned(), 1100);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut s = session();
        s.verify_email();
        complete(&mut s, &["retweet", "follow_x"]);

        let snap = s.snapshot();
        assert_eq!(
            snap.completed_tasks,
            vec![TaskId::from("follow_x"), TaskId::from("retweet")]
        );

        let restored = AirdropSession::restore(sample_definitions(), 500, &snap).unwrap();
        assert_eq!(restored, s);
    }

    #[test]
    fn test_restore_drops_unknown_tasks() {
        let snap = SessionSnapshot {
            email_verified: true,
            completed_tasks: vec![TaskId::from("retired_task"), TaskId::from("retweet")],
            claimed: false,
            claimed_token_amount: 0,
        };
        let restored = AirdropSession::restore(sample_definitions(), 500, &snap).unwrap();
        assert_eq!(restored.progress().completed, 1);
        assert_eq!(restored.snapshot().completed_tasks, vec![TaskId::from("retweet")]);
    }
}
