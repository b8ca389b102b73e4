//! Plain-text cross-chain cost report

use gas_core::{ChainState, SimulationParams};
use gas_feed::{CostComparison, GasTracker};

/// Placeholder for figures that are not live
const NOT_AVAILABLE: &str = "--";

/// Header line: network count, price and simulator settings
pub fn summary_line(connected: usize, total: usize, usd_price: f64, params: &SimulationParams) -> String {
    format!(
        "{}/{} networks active | native ${:.2} | amount {} ({} mode)",
        connected, total, usd_price, params.amount_input, params.mode
    )
}

/// Status marker for one chain
pub fn status_label(row: &CostComparison) -> &'static str {
    match (row.connected, row.stale) {
        (false, _) => "Offline",
        (true, true) => "Stale",
        (true, false) => "Live",
    }
}

/// One comparison row. Disconnected chains show `--` instead of figures;
/// stale chains keep their last figures and are marked `[Stale]`.
pub fn format_row(row: &CostComparison, amount_entered: bool) -> String {
    let status = status_label(row);

    let gas = if row.connected {
        format!(
            "${:.4} ({:.8} native)",
            row.estimate.gas_cost_usd, row.estimate.gas_cost_native
        )
    } else {
        NOT_AVAILABLE.to_string()
    };

    let (value, total) = if row.connected && amount_entered {
        (
            format!("${:.2}", row.estimate.tx_value_usd),
            format!("${:.2}", row.estimate.total_cost_usd),
        )
    } else {
        ("$0.00".to_string(), NOT_AVAILABLE.to_string())
    };

    format!(
        "{:<10} gas {:<32} value {:<12} total {:<12} [{}]",
        row.display_name, gas, value, total, status
    )
}

/// Latest fee line for one chain, `--` before the first reading
pub fn format_fees(state: &ChainState) -> String {
    if state.last_update_time == 0 {
        return format!(
            "{:<10} base {} + priority {} = {} (0 samples)",
            state.display_name, NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE
        );
    }

    format!(
        "{:<10} base {:.4} gwei + priority {:.4} gwei = {:.4} gwei ({} samples)",
        state.display_name,
        state.current_base_fee,
        state.current_priority_fee,
        state.total_fee(),
        state.history().len()
    )
}

/// Full report, one line per entry
pub fn render(tracker: &GasTracker) -> Vec<String> {
    let params = tracker.simulation();
    let rows = tracker.compare_costs();
    let amount_entered = !params.amount_input.trim().is_empty();

    let mut lines = vec![summary_line(
        tracker.connected_count(),
        rows.len(),
        tracker.get_usd_price(),
        &params,
    )];

    for chain in tracker.chains() {
        if let Ok(state) = tracker.get_chain_state(chain) {
            lines.push(format_fees(&state));
        }
    }

    lines.extend(rows.iter().map(|row| format_row(row, amount_entered)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use gas_core::{ChainId, CostEstimate, Mode};

    fn row(connected: bool) -> CostComparison {
        CostComparison {
            chain: ChainId::Polygon,
            display_name: "Polygon".to_string(),
            connected,
            stale: false,
            estimate: CostEstimate {
                gas_cost_native: 0.00189,
                gas_cost_usd: 0.9,
                tx_value_usd: 250.0,
                total_cost_usd: 250.9,
            },
        }
    }

    #[test]
    fn test_offline_row_hides_figures() {
        let line = format_row(&row(false), true);
        assert!(line.contains("gas --"));
        assert!(line.contains("value $0.00"));
        assert!(line.contains("total --"));
        assert!(line.ends_with("[Offline]"));
    }

    #[test]
    fn test_live_row() {
        let line = format_row(&row(true), true);
        assert!(line.contains("$0.9000 (0.00189000 native)"));
        assert!(line.contains("value $250.00"));
        assert!(line.contains("total $250.90"));
        assert!(line.ends_with("[Live]"));
    }

    #[test]
    fn test_stale_row_keeps_figures() {
        let stale = CostComparison {
            stale: true,
            ..row(true)
        };
        let line = format_row(&stale, true);
        assert!(line.contains("$0.9000 (0.00189000 native)"));
        assert!(line.ends_with("[Stale]"));
    }

    #[test]
    fn test_fees_before_first_reading() {
        let state = ChainState::new(ChainId::Ethereum);
        assert_eq!(
            format_fees(&state),
            "Ethereum   base -- + priority -- = -- (0 samples)"
        );

        let mut state = state;
        state.record_success(30.0, 2.0, 1_000);
        assert_eq!(
            format_fees(&state),
            "Ethereum   base 30.0000 gwei + priority 2.0000 gwei = 32.0000 gwei (1 samples)"
        );
    }

    #[test]
    fn test_empty_amount_hides_totals() {
        let line = format_row(&row(true), false);
        assert!(line.contains("total --"));
    }

    #[test]
    fn test_summary_line() {
        let params = SimulationParams::new("0.5", Mode::Simulation);
        assert_eq!(
            summary_line(2, 3, 3100.0, &params),
            "2/3 networks active | native $3100.00 | amount 0.5 (simulation mode)"
        );
    }
}
