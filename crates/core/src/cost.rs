//! Transaction cost estimates

use serde::{Deserialize, Serialize};

use crate::{ChainState, WEI_PER_GWEI};

/// Gas used by a plain native-asset transfer
pub const GAS_LIMIT_TRANSFER: u64 = 21_000;

/// Cost of sending `amount` of the native asset on one chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub gas_cost_native: f64,
    pub gas_cost_usd: f64,
    pub tx_value_usd: f64,
    pub total_cost_usd: f64,
}

/// Estimate the cost of a transfer using the chain's current fees.
///
/// Disconnected chains are priced from their last known fees.
pub fn calculate_cost(state: &ChainState, usd_price: f64, amount: f64) -> CostEstimate {
    let amount = sanitize_amount(amount);

    let gas_cost_native = state.total_fee() * GAS_LIMIT_TRANSFER as f64 / WEI_PER_GWEI;
    let gas_cost_usd = gas_cost_native * usd_price;
    let tx_value_usd = amount * usd_price;

    CostEstimate {
        gas_cost_native,
        gas_cost_usd,
        tx_value_usd,
        total_cost_usd: gas_cost_usd + tx_value_usd,
    }
}

/// Negative and non-finite amounts count as zero
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
