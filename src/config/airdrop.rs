//! Airdrop campaign and OTP configuration

use serde::{Deserialize, Serialize};

use crate::domain::{TaskDefinition, TaskId};

/// Campaign configuration (`[airdrop]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropConfig {
    /// Tokens granted on a successful claim
    #[serde(default = "default_claim_reward")]
    pub claim_reward: u64,

    /// Delay before the built-in verifier approves an opened task
    #[serde(default = "default_verification_delay_secs")]
    pub verification_delay_secs: u64,

    /// Social tasks in display order
    #[serde(default = "default_tasks")]
    pub tasks: Vec<TaskDefinition>,
}

fn default_claim_reward() -> u64 {
    500
}

fn default_verification_delay_secs() -> u64 {
    5
}

fn task(id: &str, title: &str, link: &str, reward: u64) -> TaskDefinition {
    TaskDefinition {
        id: TaskId::from(id),
        title: title.to_string(),
        link: link.to_string(),
        reward,
    }
}

pub fn default_tasks() -> Vec<TaskDefinition> {
    vec![
        task("follow_x", "Follow us on X", "https://x.com/memedrop", 250),
        task("join_telegram", "Join the Telegram group", "https://t.me/memedrop", 150),
        task(
            "retweet_launch",
            "Retweet the launch post",
            "https://x.com/memedrop/status/1",
            200,
        ),
        task("join_discord", "Join the Discord server", "https://discord.gg/memedrop", 300),
        task(
            "subscribe_youtube",
            "Subscribe on YouTube",
            "https://youtube.com/@memedrop",
            200,
        ),
    ]
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            claim_reward: default_claim_reward(),
            verification_delay_secs: default_verification_delay_secs(),
            tasks: default_tasks(),
        }
    }
}

/// One-time passcode settings (`[otp]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Wrong guesses allowed before a code is burned
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

fn default_ttl_secs() -> u64 {
    600
}

/// Upper bound for `ttl_secs` (one day)
pub const MAX_OTP_TTL_SECS: u64 = 24 * 60 * 60;

fn default_max_attempts() -> u32 {
    5
}

fn default_code_length() -> usize {
    6
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_attempts: default_max_attempts(),
            code_length: default_code_length(),
        }
    }
}
