//! Eligibility gate: decides whether a claim may proceed
//!
//! The gate is a pure function of the verification flag, task progress and
//! claim flag. It is recomputed after every state change rather than cached.

use serde::{Deserialize, Serialize};

use super::{TaskProgress, VerificationState};

/// Whether a claim is currently allowed
pub fn can_claim(verification: &VerificationState, progress: &TaskProgress, already_claimed: bool) -> bool {
    verification.email_verified && progress.is_complete() && !already_claimed
}

/// Prompt shown to the participant, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateStatus {
    Claimed,
    VerifyEmail,
    CompleteTasks { remaining: usize },
    ReadyToClaim,
}

impl GateStatus {
    /// Evaluate the status. Claimed wins over everything, then verification,
    /// then task completion.
    pub fn evaluate(verification: &VerificationState, progress: &TaskProgress, already_claimed: bool) -> Self {
        if already_claimed {
            GateStatus::Claimed
        } else if !verification.email_verified {
            GateStatus::VerifyEmail
        } else if !progress.is_complete() {
            GateStatus::CompleteTasks {
                remaining: progress.remaining(),
            }
        } else {
            GateStatus::ReadyToClaim
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            GateStatus::Claimed => "tokens claimed",
            GateStatus::VerifyEmail => "verify email",
            GateStatus::CompleteTasks { .. } => "complete remaining tasks",
            GateStatus::ReadyToClaim => "ready to claim",
        }
    }
}

impl std::fmt::Display for GateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Position in the session state machine
///
/// `Unverified -> VerifiedIncomplete -> VerifiedComplete -> Claimed`.
/// Claimed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePhase {
    Unverified,
    VerifiedIncomplete,
    VerifiedComplete,
    Claimed,
}

impl GatePhase {
    pub fn evaluate(verification: &VerificationState, progress: &TaskProgress, already_claimed: bool) -> Self {
        if already_claimed {
            GatePhase::Claimed
        } else if !verification.email_verified {
            GatePhase::Unverified
        } else if progress.is_complete() {
            GatePhase::VerifiedComplete
        } else {
            GatePhase::VerifiedIncomplete
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatePhase::Unverified => "unverified",
            GatePhase::VerifiedIncomplete => "verified_incomplete",
            GatePhase::VerifiedComplete => "verified_complete",
            GatePhase::Claimed => "claimed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GatePhase::Claimed)
    }
}

impl std::fmt::Display for GatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERIFIED: VerificationState = VerificationState { email_verified: true };
    const UNVERIFIED: VerificationState = VerificationState { email_verified: false };

    #[test]
    fn test_can_claim_every_subset() {
        // Every subset of a 5 task set, both verification states, both claim flags
        for mask in 0u32..32 {
            let completed = mask.count_ones() as usize;
            let progress = TaskProgress::new(completed, 5);
            for verification in [VERIFIED, UNVERIFIED] {
                for claimed in [false, true] {
                    let expected = mask == 0b11111 && verification.email_verified && !claimed;
                    assert_eq!(
                        can_claim(&verification, &progress, claimed),
                        expected,
                        "mask={mask:05b} verified={} claimed={claimed}",
                        verification.email_verified
                    );
                }
            }
        }
    }

    #[test]
    fn test_status_priority() {
        let done = TaskProgress::new(5, 5);
        let partial = TaskProgress::new(4, 5);

        assert_eq!(GateStatus::evaluate(&UNVERIFIED, &partial, true), GateStatus::Claimed);
        assert_eq!(GateStatus::evaluate(&UNVERIFIED, &done, false), GateStatus::VerifyEmail);
        assert_eq!(
            GateStatus::evaluate(&VERIFIED, &partial, false),
            GateStatus::CompleteTasks { remaining: 1 }
        );
        assert_eq!(GateStatus::evaluate(&VERIFIED, &done, false), GateStatus::ReadyToClaim);
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(GateStatus::VerifyEmail.message(), "verify email");
        assert_eq!(
            GateStatus::CompleteTasks { remaining: 2 }.to_string(),
            "complete remaining tasks"
        );
        assert_eq!(GateStatus::ReadyToClaim.message(), "ready to claim");
        assert_eq!(GateStatus::Claimed.message(), "tokens claimed");
    }

    #[test]
    fn test_phases() {
        let none = TaskProgress::new(0, 5);
        let done = TaskProgress::new(5, 5);

        assert_eq!(GatePhase::evaluate(&UNVERIFIED, &done, false), GatePhase::Unverified);
        assert_eq!(GatePhase::evaluate(&VERIFIED, &none, false), GatePhase::VerifiedIncomplete);
        assert_eq!(GatePhase::evaluate(&VERIFIED, &done, false), GatePhase::VerifiedComplete);
        assert!(GatePhase::evaluate(&VERIFIED, &done, true).is_terminal());
    }
}
