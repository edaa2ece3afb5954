//! Records stored in the database

use serde::{Deserialize, Serialize};

use crate::domain::SessionSnapshot;

/// Server-side mirror of a participant's airdrop session, keyed by wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub wallet_address: String,
    /// Email bound by the last successful OTP confirmation
    pub email: Option<String>,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
    /// Unix millis
    pub created_at: i64,
    pub updated_at: i64,
}

impl ParticipantRecord {
    pub fn new(wallet_address: impl Into<String>, now: i64) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            email: None,
            snapshot: SessionSnapshot::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Aggregate numbers for the admin overview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParticipantSummary {
    pub total: u64,
    pub verified: u64,
    pub claimed: u64,
    pub tokens_claimed: u64,
}

/// A stored one-time passcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: i64,
    pub email: String,
    pub code: String,
    pub expires_at: i64,
    pub attempts: u32,
    pub consumed: bool,
    pub created_at: i64,
}

/// A news item shown on the landing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Unix millis
    pub published_at: i64,
}
