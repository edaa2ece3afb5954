//! Configuration loading and management

mod airdrop;
mod income;
mod io;
mod settings;
mod token;

pub use airdrop::{default_tasks, AirdropConfig, OtpConfig, MAX_OTP_TTL_SECS};
pub use income::{ContractConfig, IncomeConfig};
pub use settings::Settings;
pub use token::generate_admin_token;
pub(crate) use token::hex_encode;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{AirdropSession, SessionSnapshot, TaskTracker};
use crate::income::parse_selector;
use crate::input::normalize_wallet;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,

    /// Airdrop campaign (tasks, claim reward)
    #[serde(default)]
    pub airdrop: AirdropConfig,

    /// Email one-time passcodes
    #[serde(default)]
    pub otp: OtpConfig,

    /// Referral income lookups
    #[serde(default)]
    pub income: IncomeConfig,
}

impl Config {
    /// Create a config with sensible defaults and a fresh admin token
    pub fn with_defaults() -> Self {
        let mut config = Self::default();
        config.settings.admin_token = generate_admin_token();
        config
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        TaskTracker::new(self.airdrop.tasks.iter().cloned())
            .context("Invalid [airdrop] task list")?;

        if self.airdrop.claim_reward == 0 {
            bail!("airdrop.claim_reward must be greater than zero");
        }

        self.airdrop
            .tasks
            .iter()
            .try_fold(0u64, |sum, t| sum.checked_add(t.reward))
            .context("Sum of airdrop task rewards overflows u64")?;

        if self.otp.ttl_secs == 0 || self.otp.ttl_secs > MAX_OTP_TTL_SECS {
            bail!(
                "otp.ttl_secs must be between 1 and {} (got {})",
                MAX_OTP_TTL_SECS,
                self.otp.ttl_secs
            );
        }

        if !(4..=10).contains(&self.otp.code_length) {
            bail!(
                "otp.code_length must be between 4 and 10 (got {})",
                self.otp.code_length
            );
        }

        if self.otp.max_attempts == 0 {
            bail!("otp.max_attempts must be greater than zero");
        }

        for contract in &self.income.contracts {
            normalize_wallet(&contract.address)
                .with_context(|| format!("Invalid address for contract '{}'", contract.name))?;
            parse_selector(&contract.selector)
                .with_context(|| format!("Invalid selector for contract '{}'", contract.name))?;
        }

        Ok(())
    }

    /// Resolved database location
    pub fn database_path(&self) -> PathBuf {
        self.settings
            .database_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("memedrop.db"))
    }

    /// Fresh session for the configured campaign
    pub fn new_session(&self) -> Result<AirdropSession> {
        Ok(AirdropSession::new(
            self.airdrop.tasks.iter().cloned(),
            self.airdrop.claim_reward,
        )?)
    }

    /// Session rebuilt from a stored snapshot
    pub fn restore_session(&self, snapshot: &SessionSnapshot) -> Result<AirdropSession> {
        Ok(AirdropSession::restore(
            self.airdrop.tasks.iter().cloned(),
            self.airdrop.claim_reward,
            snapshot,
        )?)
    }

    pub fn admin_enabled(&self) -> bool {
        !self.settings.admin_token.trim().is_empty()
    }
}
