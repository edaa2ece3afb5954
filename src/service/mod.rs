//! Airdrop service - the operations behind the REST API and the CLI
//!
//! Every operation follows the same shape: normalize input, load the
//! participant record, rebuild the [`AirdropSession`], apply one transition,
//! write the snapshot back. The store serializes that cycle per database, so
//! a verifier callback and a user request never interleave.

mod view;

pub use view::SessionView;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{AirdropError, AirdropSession, ClaimReceipt, Task, TaskId, TaskOpened};
use crate::income::{income_history, sources_from_config, IncomeHistory, RewardSource};
use crate::input::normalize_wallet;
use crate::otp::{IssuedOtp, LogDelivery, OtpCheck, OtpDelivery, OtpService};
use crate::store::{ParticipantRecord, ParticipantSummary, Store};
use crate::verifier::{DelayedVerifier, TaskVerifier};

/// Failures of the service that are not domain or input errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Income lookups are not configured")]
    IncomeDisabled,
}

/// A successful claim, keyed by the normalized wallet
#[derive(Debug, Clone, Serialize)]
pub struct ClaimConfirmation {
    pub wallet: String,
    #[serde(flatten)]
    pub receipt: ClaimReceipt,
}

/// Outcome of an OTP confirmation
#[derive(Debug, Clone, Serialize)]
pub struct OtpConfirmation {
    pub check: OtpCheck,
    pub session: SessionView,
}

#[derive(Clone)]
pub struct AirdropService {
    config: Arc<Config>,
    store: Store,
    otp: OtpService,
    verifier: Arc<dyn TaskVerifier>,
    reward_sources: Vec<Arc<dyn RewardSource>>,
    runtime: Handle,
}

impl AirdropService {
    /// Service with the default collaborators: log delivery for OTP codes,
    /// delayed honor-system verifier, JSON-RPC reward sources from `[income]`.
    pub fn new(config: Config, store: Store, runtime: Handle) -> Result<Self> {
        config.validate()?;
        let verifier = Arc::new(DelayedVerifier::new(Duration::from_secs(
            config.airdrop.verification_delay_secs,
        )));
        let reward_sources = sources_from_config(&config.income)?;
        let otp = OtpService::new(store.otp(), config.otp.clone(), Arc::new(LogDelivery));

        Ok(Self {
            config: Arc::new(config),
            store,
            otp,
            verifier,
            reward_sources,
            runtime,
        })
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn TaskVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn OtpDelivery>) -> Self {
        self.otp = OtpService::new(self.store.otp(), self.config.otp.clone(), delivery);
        self
    }

    pub fn with_reward_sources(mut self, sources: Vec<Arc<dyn RewardSource>>) -> Self {
        self.reward_sources = sources;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================================
    // SESSION
    // ========================================

    /// Current session of a wallet. Unknown wallets get a fresh session
    /// without creating a record.
    pub fn session(&self, wallet: &str) -> Result<SessionView> {
        let wallet = normalize_wallet(wallet)?;
        let view = match self.store.participants().get(&wallet)? {
            Some(record) => {
                let session = self.config.restore_session(&record.snapshot)?;
                SessionView::new(&record, &session)
            }
            None => {
                let record = ParticipantRecord::new(wallet.as_str(), chrono::Utc::now().timestamp_millis());
                SessionView::new(&record, &self.config.new_session()?)
            }
        };
        Ok(view)
    }

    /// Run one transition against the stored session of `wallet`
    fn with_session<T>(
        &self,
        wallet: &str,
        f: impl FnOnce(&mut AirdropSession, &mut ParticipantRecord) -> Result<T>,
    ) -> Result<T> {
        self.store.participants().update(wallet, |record| {
            let mut session = self.config.restore_session(&record.snapshot)?;
            let value = f(&mut session, record)?;
            record.snapshot = session.snapshot();
            Ok(value)
        })
    }

    // ========================================
    // EMAIL VERIFICATION
    // ========================================

    /// Send a verification code and register the wallet
    pub fn request_otp(&self, wallet: &str, email: &str) -> Result<IssuedOtp> {
        let wallet = normalize_wallet(wallet)?;
        let issued = self.otp.issue(email)?;
        self.with_session(&wallet, |_, _| Ok(()))?;
        info!("[memedrop:otp] Code issued for {} ({})", wallet, issued.email);
        Ok(issued)
    }

    /// Check a code; on success bind the email and mark it verified
    pub fn confirm_otp(&self, wallet: &str, email: &str, code: &str) -> Result<OtpConfirmation> {
        let wallet = normalize_wallet(wallet)?;
        let check = self.otp.confirm(email, code)?;

        if !check.is_verified() {
            debug!("[memedrop:otp] Confirmation for {} failed: {:?}", wallet, check);
            return Ok(OtpConfirmation {
                check,
                session: self.session(&wallet)?,
            });
        }

        let email = crate::input::normalize_email(email)?;
        let session = self.with_session(&wallet, |session, record| {
            record.email = Some(email.clone());
            if session.verify_email() {
                info!("[memedrop:otp] {} verified {}", wallet, email);
            }
            Ok(SessionView::new(record, session))
        })?;

        Ok(OtpConfirmation { check, session })
    }

    // ========================================
    // TASKS
    // ========================================

    /// Record a task visit and start its verification in the background
    pub fn open_task(&self, wallet: &str, task_id: &str) -> Result<TaskOpened> {
        let wallet = normalize_wallet(wallet)?;
        let task_id = TaskId::from(task_id);
        let opened = self.with_session(&wallet, |session, _| Ok(session.mark_task_opened(&task_id)?))?;

        if opened.needs_verification() {
            let service = self.clone();
            let wallet = wallet.clone();
            let id = task_id.clone();
            self.runtime.spawn(async move {
                if let Err(e) = service.complete_verification(&wallet, id.as_str()).await {
                    warn!("[memedrop:verify] {} task '{}': {:#}", wallet, id, e);
                }
            });
        }

        debug!("[memedrop:task] {} opened '{}'", wallet, task_id);
        Ok(opened)
    }

    /// Ask the verifier about one task and apply its answer.
    /// Returns true if the task became completed.
    pub async fn complete_verification(&self, wallet: &str, task_id: &str) -> Result<bool> {
        let wallet = normalize_wallet(wallet)?;
        let task_id = TaskId::from(task_id);
        let task: Task = self
            .config
            .airdrop
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or_else(|| AirdropError::TaskNotFound(task_id.clone()))?
            .into();

        let result = self.verifier.verify(&wallet, &task).await?;
        if result.task_id != task_id {
            return Err(anyhow!(
                "Verifier answered for '{}' instead of '{}'",
                result.task_id,
                task_id
            ));
        }

        let completed = self.with_session(&wallet, |session, _| Ok(session.apply_verification(&result)?))?;
        if completed {
            info!("[memedrop:verify] {} completed '{}'", wallet, task_id);
        } else if !result.verified {
            info!("[memedrop:verify] {} not verified for '{}'", wallet, task_id);
        }
        Ok(completed)
    }

    // ========================================
    // CLAIM
    // ========================================

    pub fn claim(&self, wallet: &str) -> Result<ClaimConfirmation> {
        let wallet = normalize_wallet(wallet)?;
        let receipt = self.with_session(&wallet, |session, _| Ok(session.claim()?))?;
        info!("[memedrop:claim] {} claimed {} tokens", wallet, receipt.amount);
        Ok(ClaimConfirmation { wallet, receipt })
    }

    // ========================================
    // INCOME & ADMIN
    // ========================================

    pub async fn income(&self, wallet: &str) -> Result<IncomeHistory> {
        let wallet = normalize_wallet(wallet)?;
        if self.reward_sources.is_empty() {
            return Err(ServiceError::IncomeDisabled.into());
        }
        income_history(&self.reward_sources, &wallet, self.config.income.levels).await
    }

    pub fn participants(&self) -> Result<(ParticipantSummary, Vec<ParticipantRecord>)> {
        let participants = self.store.participants();
        Ok((participants.summary()?, participants.list()?))
    }

    /// Handle used to run async operations from non-async threads
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }
}
