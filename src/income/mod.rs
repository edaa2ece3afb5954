//! Referral income history
//!
//! Sums the rewards a wallet has claimed per referral level across every
//! configured reward contract. Display only: eligibility never depends on it.

mod rpc;

pub use rpc::{parse_selector, JsonRpcRewardSource};

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use serde::{Serialize, Serializer};

use crate::config::IncomeConfig;

/// Read-only view of claimed rewards for one contract
pub trait RewardSource: Send + Sync {
    fn name(&self) -> &str;

    /// Claimed reward of `wallet` at referral `level` (1-based), in base units
    fn claimed_reward(&self, wallet: &str, level: u8) -> Result<u128>;
}

/// Amounts are serialized as decimal strings; JSON numbers lose precision
fn as_decimal<S: Serializer>(value: &u128, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceAmount {
    pub source: String,
    #[serde(serialize_with = "as_decimal")]
    pub amount: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelIncome {
    pub level: u8,
    pub sources: Vec<SourceAmount>,
    #[serde(serialize_with = "as_decimal")]
    pub total: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeHistory {
    pub wallet: String,
    pub levels: Vec<LevelIncome>,
    #[serde(serialize_with = "as_decimal")]
    pub total: u128,
}

/// Build reward sources from `[income]`; empty when lookups are disabled
pub fn sources_from_config(config: &IncomeConfig) -> Result<Vec<Arc<dyn RewardSource>>> {
    let Some(rpc_url) = config.rpc_url.as_deref().filter(|_| config.is_enabled()) else {
        return Ok(Vec::new());
    };
    config
        .contracts
        .iter()
        .map(|c| Ok(Arc::new(JsonRpcRewardSource::new(rpc_url, c)?) as Arc<dyn RewardSource>))
        .collect()
}

/// Query every source for levels `1..=levels` and aggregate.
///
/// Lookups are blocking HTTP calls and run concurrently on the blocking pool.
pub async fn income_history(
    sources: &[Arc<dyn RewardSource>],
    wallet: &str,
    levels: u8,
) -> Result<IncomeHistory> {
    let lookups = sources.iter().flat_map(|source| {
        (1..=levels).map(move |level| {
            let source = Arc::clone(source);
            let wallet = wallet.to_string();
            tokio::task::spawn_blocking(move || {
                source
                    .claimed_reward(&wallet, level)
                    .with_context(|| format!("{} level {}", source.name(), level))
                    .map(|amount| (level, source.name().to_string(), amount))
            })
        })
    });

    let results = try_join_all(lookups)
        .await
        .context("Reward lookup task panicked")?;

    let mut rows: Vec<LevelIncome> = (1..=levels)
        .map(|level| LevelIncome {
            level,
            sources: Vec::new(),
            total: 0,
        })
        .collect();

    for result in results {
        let (level, source, amount) = result?;
        let row = &mut rows[(level - 1) as usize];
        row.total = row.total.saturating_add(amount);
        row.sources.push(SourceAmount { source, amount });
    }

    let total = rows.iter().fold(0u128, |acc, r| acc.saturating_add(r.total));
    Ok(IncomeHistory {
        wallet: wallet.to_string(),
        levels: rows,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        name: &'static str,
        per_level: Vec<u128>,
    }

    impl RewardSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        fn claimed_reward(&self, _wallet: &str, level: u8) -> Result<u128> {
            self.per_level
                .get((level - 1) as usize)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("no level {}", level))
        }
    }

    fn sources() -> Vec<Arc<dyn RewardSource>> {
        vec![
            Arc::new(FixedSource {
                name: "staking",
                per_level: vec![100, 50, 0],
            }),
            Arc::new(FixedSource {
                name: "referral",
                per_level: vec![10, 5, 1],
            }),
        ]
    }

    #[tokio::test]
    async fn test_sums_levels_across_sources() {
        let history = income_history(&sources(), "0xabc", 3).await.unwrap();
        assert_eq!(history.levels.len(), 3);
        assert_eq!(history.levels[0].total, 110);
        assert_eq!(history.levels[1].total, 55);
        assert_eq!(history.levels[2].total, 1);
        assert_eq!(history.levels[0].sources.len(), 2);
        assert_eq!(history.total, 166);
    }

    #[tokio::test]
    async fn test_failing_source_fails_history() {
        let err = income_history(&sources(), "0xabc", 4).await.unwrap_err();
        assert!(format!("{:#}", err).contains("level 4"));
    }

    #[tokio::test]
    async fn test_amounts_serialize_as_strings() {
        let history = income_history(&sources(), "0xabc", 1).await.unwrap();
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["total"], "110");
        assert_eq!(json["levels"][0]["sources"][1]["amount"], "10");
    }

    #[test]
    fn test_disabled_config_has_no_sources() {
        assert!(sources_from_config(&IncomeConfig::default()).unwrap().is_empty());
    }
}
