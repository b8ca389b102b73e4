//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::{ChainId, CoreError, CoreResult, DEFAULT_SIMULATION_AMOUNT};

/// Period between fetch cycles
pub const TICK_PERIOD: Duration = Duration::from_millis(6_000);

/// RPC endpoint for one tracked chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    pub chain: ChainId,
    pub http_url: String,
}

impl RpcConfig {
    pub fn default_for(chain: ChainId) -> Self {
        Self {
            chain,
            http_url: chain.default_rpc_url().to_string(),
        }
    }
}

/// USD price source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub base_url: String,
    /// CoinGecko id of the native asset priced in USD
    pub coin_id: String,
    pub api_key: Option<String>,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            coin_id: "ethereum".to_string(),
            api_key: None,
        }
    }
}

/// Complete tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub chains: Vec<RpcConfig>,
    pub price: PriceConfig,
    /// Upper bound on a single fee or price fetch
    pub fetch_timeout_ms: u64,
    pub simulation_amount: String,
    pub report_interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            chains: ChainId::ALL.into_iter().map(RpcConfig::default_for).collect(),
            price: PriceConfig::default(),
            fetch_timeout_ms: 5_000,
            simulation_amount: DEFAULT_SIMULATION_AMOUNT.to_string(),
            report_interval_secs: 30,
        }
    }
}

impl TrackerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    pub fn get_chain_config(&self, chain: ChainId) -> Option<&RpcConfig> {
        self.chains.iter().find(|c| c.chain == chain)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.chains.is_empty() {
            return Err(CoreError::InvalidConfig("no chains configured".to_string()));
        }

        let mut seen = HashSet::new();
        for rpc in &self.chains {
            if !seen.insert(rpc.chain) {
                return Err(CoreError::InvalidConfig(format!(
                    "chain {} configured twice",
                    rpc.chain
                )));
            }
            if rpc.http_url.trim().is_empty() {
                return Err(CoreError::InvalidConfig(format!(
                    "empty rpc url for {}",
                    rpc.chain
                )));
            }
        }

        if self.fetch_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "fetch_timeout_ms must be positive".to_string(),
            ));
        }
        if self.fetch_timeout() >= TICK_PERIOD {
            return Err(CoreError::InvalidConfig(format!(
                "fetch_timeout_ms must be below the {} ms tick period",
                TICK_PERIOD.as_millis()
            )));
        }
        if self.report_interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "report_interval_secs must be positive".to_string(),
            ));
        }
        if self.price.base_url.trim().is_empty() || self.price.coin_id.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "price source needs base_url and coin_id".to_string(),
            ));
        }

        Ok(())
    }
}
