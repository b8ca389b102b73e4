//! Wallet simulator inputs

use serde::{Deserialize, Serialize};

use crate::Mode;

/// Amount shown before the user types anything
pub const DEFAULT_SIMULATION_AMOUNT: &str = "0.5";

/// Transfer amount and display mode for cost comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Amount exactly as entered
    pub amount_input: String,
    /// Parsed amount in native units, 0 when `amount_input` is not a number
    pub amount: f64,
    pub mode: Mode,
}

impl SimulationParams {
    pub fn new(amount_input: &str, mode: Mode) -> Self {
        Self {
            amount_input: amount_input.to_string(),
            amount: parse_amount(amount_input),
            mode,
        }
    }

    pub fn set_amount(&mut self, amount_input: &str) {
        self.amount_input = amount_input.to_string();
        self.amount = parse_amount(amount_input);
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATION_AMOUNT, Mode::Live)
    }
}

/// Parse a user-entered amount. Anything unparsable, negative or non-finite is 0.
pub fn parse_amount(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0.5"), 0.5);
        assert_eq!(parse_amount(" 2 "), 2.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("-3"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
    }

    #[test]
    fn test_defaults() {
        let params = SimulationParams::default();
        assert_eq!(params.amount_input, "0.5");
        assert_eq!(params.amount, 0.5);
        assert_eq!(params.mode, Mode::Live);
    }

    #[test]
    fn test_set_amount_keeps_raw_input() {
        let mut params = SimulationParams::default();
        params.set_amount("abc");
        assert_eq!(params.amount_input, "abc");
        assert_eq!(params.amount, 0.0);
    }
}
