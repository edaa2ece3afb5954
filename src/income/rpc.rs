//! JSON-RPC `eth_call` reward source
//!
//! Each configured contract exposes `f(address wallet, uint256 level) returns
//! (uint256)`. The selector is configured, so no ABI tooling is needed here.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::json;

use super::RewardSource;
use crate::config::{hex_encode, ContractConfig};
use crate::input::normalize_wallet;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Reads claimed referral rewards from one contract
pub struct JsonRpcRewardSource {
    name: String,
    rpc_url: String,
    contract: String,
    selector: [u8; 4],
    client: ureq::Agent,
}

impl JsonRpcRewardSource {
    pub fn new(rpc_url: impl Into<String>, contract: &ContractConfig) -> Result<Self> {
        let client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .build();

        Ok(Self {
            name: contract.name.clone(),
            rpc_url: rpc_url.into(),
            contract: normalize_wallet(&contract.address)?,
            selector: parse_selector(&contract.selector)?,
            client,
        })
    }
}

impl RewardSource for JsonRpcRewardSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn claimed_reward(&self, wallet: &str, level: u8) -> Result<u128> {
        let data = encode_call(&self.selector, wallet, level)?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": self.contract, "data": data }, "latest"],
        });

        let response: RpcResponse = self
            .client
            .post(&self.rpc_url)
            .send_json(body)
            .with_context(|| format!("eth_call to {} failed", self.name))?
            .into_json()
            .with_context(|| format!("Invalid JSON-RPC response from {}", self.name))?;

        if let Some(err) = response.error {
            bail!("{} returned RPC error {}: {}", self.name, err.code, err.message);
        }
        let word = response
            .result
            .ok_or_else(|| anyhow!("{} returned no result", self.name))?;
        decode_word(&word)
    }
}

/// Parse a 4-byte function selector from hex (with or without 0x)
pub fn parse_selector(raw: &str) -> Result<[u8; 4]> {
    let hex = raw.trim().trim_start_matches("0x");
    if hex.len() != 8 || !hex.is_ascii() {
        bail!("selector must be 4 bytes of hex, got '{}'", raw);
    }
    let mut out = [0u8; 4];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .with_context(|| format!("selector is not hex: '{}'", raw))?;
    }
    Ok(out)
}

/// Calldata for `f(address, uint256)`
fn encode_call(selector: &[u8; 4], wallet: &str, level: u8) -> Result<String> {
    let wallet = normalize_wallet(wallet)?;
    Ok(format!(
        "0x{}{:0>64}{:064x}",
        hex_encode(selector),
        wallet.trim_start_matches("0x"),
        level
    ))
}

/// Decode a big-endian uint256 hex word that must fit in u128
fn decode_word(raw: &str) -> Result<u128> {
    let hex = raw.trim().trim_start_matches("0x");
    if hex.is_empty() {
        return Ok(0);
    }
    if hex.len() > 64 {
        bail!("return data longer than one word: {} hex chars", hex.len());
    }
    let significant = hex.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    if significant.len() > 32 {
        bail!("reward does not fit in u128: 0x{}", hex);
    }
    u128::from_str_radix(significant, 16).with_context(|| format!("return data is not hex: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector() {
        assert_eq!(parse_selector("0x70a08231").unwrap(), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(parse_selector("70a08231").unwrap(), [0x70, 0xa0, 0x82, 0x31]);
        assert!(parse_selector("0x70a082").is_err());
        assert!(parse_selector("0xzza08231").is_err());
        // 8 bytes but not 8 hex digits
        assert!(parse_selector("0xa\u{e9}12345").is_err());
    }

    #[test]
    fn test_encode_call_layout() {
        let wallet = "0xAbCdEf0123456789abcdef0123456789ABCDEF01";
        let data = encode_call(&[0xde, 0xad, 0xbe, 0xef], wallet, 3).unwrap();

        assert_eq!(data.len(), 2 + 8 + 64 + 64);
        assert!(data.starts_with("0xdeadbeef000000000000000000000000abcdef"));
        assert!(data.ends_with(&format!("{}3", "0".repeat(63))));
    }

    #[test]
    fn test_decode_word() {
        assert_eq!(decode_word("0x").unwrap(), 0);
        assert_eq!(decode_word(&format!("0x{}", "0".repeat(64))).unwrap(), 0);
        assert_eq!(
            decode_word(&format!("0x{:064x}", 1_500_000_000_000_000_000u128)).unwrap(),
            1_500_000_000_000_000_000
        );
        assert!(decode_word(&format!("0x1{}", "0".repeat(63))).is_err());
        assert!(decode_word(&"0".repeat(66)).is_err());
    }
}
