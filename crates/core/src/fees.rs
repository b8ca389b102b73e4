//! Raw fee data as reported by a fee source

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Wei per gwei
pub const WEI_PER_GWEI: f64 = 1e9;

/// Fee data returned by one fetch, in wei.
///
/// Either field may be absent; absent reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSnapshot {
    pub gas_price_wei: Option<U256>,
    pub max_priority_fee_per_gas_wei: Option<U256>,
}

impl FeeSnapshot {
    pub fn new(gas_price_wei: U256, max_priority_fee_per_gas_wei: U256) -> Self {
        Self {
            gas_price_wei: Some(gas_price_wei),
            max_priority_fee_per_gas_wei: Some(max_priority_fee_per_gas_wei),
        }
    }

    pub fn from_wei(gas_price_wei: u128, max_priority_fee_per_gas_wei: u128) -> Self {
        Self::new(
            U256::from(gas_price_wei),
            U256::from(max_priority_fee_per_gas_wei),
        )
    }

    pub fn base_fee_gwei(&self) -> f64 {
        wei_to_gwei(self.gas_price_wei.unwrap_or(U256::ZERO))
    }

    pub fn priority_fee_gwei(&self) -> f64 {
        wei_to_gwei(self.max_priority_fee_per_gas_wei.unwrap_or(U256::ZERO))
    }
}

/// Convert a wei quantity into gwei-equivalent units
pub fn wei_to_gwei(wei: U256) -> f64 {
    let raw: f64 = wei.to_string().parse().unwrap_or(0.0);
    raw / WEI_PER_GWEI
}
