//! Referral income lookup configuration (`[income]`)

use serde::{Deserialize, Serialize};

/// A reward contract queried for claimed referral rewards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Display name (e.g. "staking", "referral")
    pub name: String,
    /// Contract address (0x + 40 hex)
    pub address: String,
    /// 4-byte selector of `f(address,uint256) returns (uint256)`, hex encoded
    pub selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeConfig {
    /// JSON-RPC endpoint. Income lookups are disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Number of referral levels (queried as 1..=levels)
    #[serde(default = "default_levels")]
    pub levels: u8,

    #[serde(default)]
    pub contracts: Vec<ContractConfig>,
}

fn default_levels() -> u8 {
    5
}

impl Default for IncomeConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            levels: default_levels(),
            contracts: Vec::new(),
        }
    }
}

impl IncomeConfig {
    pub fn is_enabled(&self) -> bool {
        self.rpc_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
            && !self.contracts.is_empty()
    }
}
