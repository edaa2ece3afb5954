//! Verification and claim state of a participant session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Email verification flag, set once by OTP confirmation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationState {
    pub email_verified: bool,
}

impl VerificationState {
    /// Mark the email as verified. Returns false if it already was.
    pub fn verify(&mut self) -> bool {
        let changed = !self.email_verified;
        self.email_verified = true;
        changed
    }
}

/// Terminal claim record. Flips to claimed at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimState {
    pub claimed: bool,
    pub claimed_token_amount: u64,
}

/// Returned by a successful claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    pub amount: u64,
    pub claimed_at: DateTime<Utc>,
}
