//! Email verification with one-time passcodes
//!
//! Codes are numeric, stored with an expiry and burned after too many wrong
//! guesses. Delivery is pluggable: the mail transport lives outside this crate.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::OtpConfig;
use crate::input::{normalize_email, validate_code};
use crate::store::OtpStore;

/// Sends an issued code to its owner
pub trait OtpDelivery: Send + Sync {
    fn deliver(&self, email: &str, code: &str) -> Result<()>;
}

/// Writes codes to the log. Default for local runs.
pub struct LogDelivery;

impl OtpDelivery for LogDelivery {
    fn deliver(&self, email: &str, code: &str) -> Result<()> {
        info!("[memedrop:otp] Code for {}: {}", email, code);
        Ok(())
    }
}

/// Keeps delivered codes in memory; used by tests and demos
#[derive(Default)]
pub struct MemoryDelivery {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryDelivery {
    /// Most recent code sent to `email`
    pub fn last_code(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().ok()?;
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

impl OtpDelivery for MemoryDelivery {
    fn deliver(&self, email: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("delivery lock poisoned"))?
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// Result of issuing a code
#[derive(Debug, Clone, Serialize)]
pub struct IssuedOtp {
    pub email: String,
    /// Unix millis
    pub expires_at: i64,
}

/// Result of checking a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OtpCheck {
    Verified,
    Mismatch { attempts_left: u32 },
    /// Too many wrong guesses; the code is burned
    Exhausted,
    /// No unexpired code was issued for this email
    NoActiveCode,
}

impl OtpCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, OtpCheck::Verified)
    }
}

#[derive(Clone)]
pub struct OtpService {
    store: OtpStore,
    config: OtpConfig,
    delivery: Arc<dyn OtpDelivery>,
}

impl OtpService {
    pub fn new(store: OtpStore, config: OtpConfig, delivery: Arc<dyn OtpDelivery>) -> Self {
        Self {
            store,
            config,
            delivery,
        }
    }

    /// Generate, store and deliver a fresh code for `email`
    pub fn issue(&self, email: &str) -> Result<IssuedOtp> {
        let email = normalize_email(email)?;
        let now = Utc::now().timestamp_millis();
        let ttl_ms = i64::try_from(self.config.ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_ms);

        let code = generate_code(self.config.code_length)?;
        self.store.insert(&email, &code, expires_at, now)?;
        self.delivery
            .deliver(&email, &code)
            .with_context(|| format!("Failed to deliver code to {}", email))?;

        let purged = self.store.purge_expired(now)?;
        if purged > 0 {
            tracing::debug!("[memedrop:otp] Purged {} stale codes", purged);
        }

        Ok(IssuedOtp { email, expires_at })
    }

    /// Check a code. A match consumes it.
    pub fn confirm(&self, email: &str, code: &str) -> Result<OtpCheck> {
        let email = normalize_email(email)?;
        let code = validate_code(code, self.config.code_length)?;
        let now = Utc::now().timestamp_millis();

        let Some(active) = self.store.latest_active(&email, now)? else {
            return Ok(OtpCheck::NoActiveCode);
        };

        if codes_match(&active.code, &code) {
            self.store.consume(active.id)?;
            return Ok(OtpCheck::Verified);
        }

        let attempts = self.store.record_attempt(active.id)?;
        if attempts >= self.config.max_attempts {
            warn!("[memedrop:otp] Too many attempts for {}, code burned", email);
            self.store.consume(active.id)?;
            return Ok(OtpCheck::Exhausted);
        }

        Ok(OtpCheck::Mismatch {
            attempts_left: self.config.max_attempts - attempts,
        })
    }
}

fn generate_code(length: usize) -> Result<String> {
    let mut bytes = [0u8; 8];
    getrandom::getrandom(&mut bytes).map_err(|e| anyhow::anyhow!("OS RNG unavailable: {}", e))?;
    let modulus = 10u64.pow(length as u32);
    let value = u64::from_le_bytes(bytes) % modulus;
    Ok(format!("{:0width$}", value, width = length))
}

/// Compare without short-circuiting on the first differing digit
fn codes_match(expected: &str, given: &str) -> bool {
    expected.len() == given.len()
        && expected
            .bytes()
            .zip(given.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn service(max_attempts: u32) -> (OtpService, Arc<MemoryDelivery>) {
        let store = Store::open_in_memory().unwrap();
        let delivery = Arc::new(MemoryDelivery::default());
        let config = OtpConfig {
            max_attempts,
            ..OtpConfig::default()
        };
        (OtpService::new(store.otp(), config, delivery.clone()), delivery)
    }

    fn wrong(code: &str) -> String {
        let first = if code.starts_with('0') { '1' } else { '0' };
        format!("{}{}", first, &code[1..])
    }

    #[test]
    fn test_generate_code_shape() {
        for len in [4, 6, 10] {
            let code = generate_code(len).unwrap();
            assert_eq!(code.len(), len);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_issue_and_confirm() {
        let (svc, delivery) = service(5);
        let issued = svc.issue("Holder@Example.com").unwrap();
        assert_eq!(issued.email, "holder@example.com");

        let code = delivery.last_code("holder@example.com").unwrap();
        assert_eq!(svc.confirm("holder@example.com", &code).unwrap(), OtpCheck::Verified);

        // Consumed codes cannot be reused
        assert_eq!(svc.confirm("holder@example.com", &code).unwrap(), OtpCheck::NoActiveCode);
    }

    #[test]
    fn test_wrong_guesses_burn_code() {
        let (svc, delivery) = service(2);
        svc.issue("a@example.com").unwrap();
        let code = delivery.last_code("a@example.com").unwrap();
        let bad = wrong(&code);

        assert_eq!(
            svc.confirm("a@example.com", &bad).unwrap(),
            OtpCheck::Mismatch { attempts_left: 1 }
        );
        assert_eq!(svc.confirm("a@example.com", &bad).unwrap(), OtpCheck::Exhausted);
        assert_eq!(svc.confirm("a@example.com", &code).unwrap(), OtpCheck::NoActiveCode);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let store = Store::open_in_memory().unwrap();
        let delivery = Arc::new(MemoryDelivery::default());
        let config = OtpConfig {
            ttl_secs: u64::MAX,
            ..OtpConfig::default()
        };
        let svc = OtpService::new(store.otp(), config, delivery.clone());

        let issued = svc.issue("a@example.com").unwrap();
        assert_eq!(issued.expires_at, i64::MAX);
        let code = delivery.last_code("a@example.com").unwrap();
        assert_eq!(svc.confirm("a@example.com", &code).unwrap(), OtpCheck::Verified);
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let (svc, _) = service(5);
        assert!(svc.issue("nope").is_err());
        assert!(svc.confirm("a@example.com", "12").is_err());
    }

    #[test]
    fn test_codes_match() {
        assert!(codes_match("123456", "123456"));
        assert!(!codes_match("123456", "123457"));
        assert!(!codes_match("123456", "12345"));
    }
}
