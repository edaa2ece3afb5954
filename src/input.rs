//! Validation and normalization of user-supplied identifiers

use once_cell::sync::Lazy;
use regex::Regex;

static WALLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid wallet regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Malformed input from a client or the command line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid verification code")]
    InvalidCode,
}

/// Validate an EVM wallet address and return it lowercased
pub fn normalize_wallet(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if !WALLET_RE.is_match(trimmed) {
        return Err(InputError::InvalidWallet(raw.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Validate an email address and return it lowercased
pub fn normalize_email(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.len() > 254 || !EMAIL_RE.is_match(trimmed) {
        return Err(InputError::InvalidEmail(raw.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Numeric OTP code of the configured length
pub fn validate_code(raw: &str, length: usize) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.len() != length || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidCode);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_is_lowercased() {
        let w = normalize_wallet(" 0xAbCdEf0123456789abcdef0123456789ABCDEF01 ").unwrap();
        assert_eq!(w, "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_wallet_rejects_bad_input() {
        assert!(normalize_wallet("0x123").is_err());
        assert!(normalize_wallet("abcdef0123456789abcdef0123456789abcdef0123").is_err());
        assert!(normalize_wallet("0xZZcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn test_email() {
        assert_eq!(normalize_email("Holder@Example.COM").unwrap(), "holder@example.com");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a@b").is_err());
    }

    #[test]
    fn test_code() {
        assert_eq!(validate_code(" 012345", 6).unwrap(), "012345");
        assert_eq!(validate_code("12345", 6), Err(InputError::InvalidCode));
        assert_eq!(validate_code("12a456", 6), Err(InputError::InvalidCode));
    }
}
