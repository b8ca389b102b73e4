//! Fee samples and per-chain state

use serde::Serialize;
use std::collections::VecDeque;

use crate::ChainId;

/// Maximum number of samples kept per chain
pub const HISTORY_CAPACITY: usize = 100;

/// A connected chain with no success for this long is shown as stale
pub const STALE_AFTER_MS: u64 = 30_000;

/// One fee observation, in gwei
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasSample {
    timestamp: u64,
    base_fee: f64,
    priority_fee: f64,
    total_fee: f64,
}

impl GasSample {
    pub fn new(timestamp: u64, base_fee: f64, priority_fee: f64) -> Self {
        Self {
            timestamp,
            base_fee,
            priority_fee,
            total_fee: base_fee + priority_fee,
        }
    }

    /// Milliseconds since epoch
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn base_fee(&self) -> f64 {
        self.base_fee
    }

    pub fn priority_fee(&self) -> f64 {
        self.priority_fee
    }

    pub fn total_fee(&self) -> f64 {
        self.total_fee
    }
}

/// Current and historical fee data for one chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainState {
    pub display_name: String,
    pub current_base_fee: f64,
    pub current_priority_fee: f64,
    /// Result of the most recent fetch attempt
    pub connected: bool,
    /// Time of the last successful fetch, 0 if never
    pub last_update_time: u64,
    history: VecDeque<GasSample>,
}

impl ChainState {
    pub fn new(chain: ChainId) -> Self {
        Self::with_display_name(chain.display_name())
    }

    pub fn with_display_name(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            current_base_fee: 0.0,
            current_priority_fee: 0.0,
            connected: false,
            last_update_time: 0,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Oldest first, arrival order
    pub fn history(&self) -> &VecDeque<GasSample> {
        &self.history
    }

    pub fn latest_sample(&self) -> Option<&GasSample> {
        self.history.back()
    }

    pub fn total_fee(&self) -> f64 {
        self.current_base_fee + self.current_priority_fee
    }

    /// Apply a successful fetch and append it to the history window
    pub fn record_success(&mut self, base_fee: f64, priority_fee: f64, now_ms: u64) {
        self.current_base_fee = base_fee;
        self.current_priority_fee = priority_fee;
        self.connected = true;
        self.last_update_time = now_ms;

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(GasSample::new(now_ms, base_fee, priority_fee));
    }

    /// Connected, but the last success is older than `max_age_ms`
    pub fn is_stale(&self, now_ms: u64, max_age_ms: u64) -> bool {
        self.connected && now_ms.saturating_sub(self.last_update_time) > max_age_ms
    }

    /// Failed fetches keep the last known fees and history
    pub fn record_failure(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_total_is_derived() {
        let sample = GasSample::new(1_000, 30.0, 2.0);
        assert_eq!(sample.total_fee(), 32.0);
    }

    #[test]
    fn test_is_stale() {
        let mut state = ChainState::new(ChainId::Arbitrum);
        assert!(!state.is_stale(100_000, STALE_AFTER_MS));

        state.record_success(0.01, 0.0, 10_000);
        assert!(!state.is_stale(10_000 + STALE_AFTER_MS, STALE_AFTER_MS));
        assert!(state.is_stale(10_001 + STALE_AFTER_MS, STALE_AFTER_MS));
        // Clock behind the last update
        assert!(!state.is_stale(5_000, STALE_AFTER_MS));

        state.record_failure();
        assert!(!state.is_stale(100_000, STALE_AFTER_MS));
    }

    #[test]
    fn test_new_state_is_disconnected_and_empty() {
        let state = ChainState::new(ChainId::Polygon);
        assert_eq!(state.display_name, "Polygon");
        assert!(!state.connected);
        assert_eq!(state.last_update_time, 0);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_record_success_updates_everything() {
        let mut state = ChainState::new(ChainId::Ethereum);
        state.record_success(30.0, 2.0, 42);

        assert!(state.connected);
        assert_eq!(state.current_base_fee, 30.0);
        assert_eq!(state.current_priority_fee, 2.0);
        assert_eq!(state.last_update_time, 42);
        assert_eq!(state.latest_sample(), Some(&GasSample::new(42, 30.0, 2.0)));
    }

    #[test]
    fn test_record_failure_keeps_last_values() {
        let mut state = ChainState::new(ChainId::Ethereum);
        state.record_success(30.0, 2.0, 42);
        state.record_failure();

        assert!(!state.connected);
        assert_eq!(state.total_fee(), 32.0);
        assert_eq!(state.last_update_time, 42);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_history_window_evicts_oldest() {
        let mut state = ChainState::new(ChainId::Arbitrum);
        for i in 0..HISTORY_CAPACITY as u64 {
            state.record_success(i as f64, 0.0, i);
        }
        assert_eq!(state.history().len(), HISTORY_CAPACITY);
        assert_eq!(state.history().front().unwrap().timestamp(), 0);

        state.record_success(1_000.0, 0.0, 1_000);
        assert_eq!(state.history().len(), HISTORY_CAPACITY);
        assert_eq!(state.history().front().unwrap().timestamp(), 1);
        assert_eq!(state.history().back().unwrap().timestamp(), 1_000);
    }
}
