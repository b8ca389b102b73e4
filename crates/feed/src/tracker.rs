//! Consumer-facing facade over the store, poller and pure calculators

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::info;

use gas_core::{
    bucketize, calculate_cost, ChainId, ChainState, CoreError, CoreResult, CostEstimate,
    GasSample, Mode, OhlcBucket, SimulationParams, TrackerConfig, STALE_AFTER_MS, TICK_PERIOD,
};

use crate::feeds::{CoinGeckoPriceSource, FeeSource, JsonRpcFeeSource, PriceSource};
use crate::poller::{CycleReport, FeePoller, PollerConfig};
use crate::state::{ChainStore, StoreEvent};

/// One row of the cross-chain cost comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComparison {
    pub chain: ChainId,
    pub display_name: String,
    /// Callers show last-known numbers as stale when false
    pub connected: bool,
    /// Connected, but no successful fetch for `STALE_AFTER_MS`
    pub stale: bool,
    pub estimate: CostEstimate,
}

/// Gas tracker: live fee state, OHLC history and cost estimates per chain
pub struct GasTracker {
    store: Arc<ChainStore>,
    poller: FeePoller,
    simulation: RwLock<SimulationParams>,
}

impl GasTracker {
    pub fn new(store: Arc<ChainStore>, poller: FeePoller) -> Self {
        Self {
            store,
            poller,
            simulation: RwLock::new(SimulationParams::default()),
        }
    }

    /// Build a tracker with JSON-RPC fee sources and the CoinGecko price source
    pub fn from_config(config: &TrackerConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(concat!("gas-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let store = Arc::new(ChainStore::new(config.chains.iter().map(|c| c.chain)));

        let fee_sources: Vec<Arc<dyn FeeSource>> = config
            .chains
            .iter()
            .map(|rpc| {
                let source = JsonRpcFeeSource::new(rpc.chain, rpc.http_url.clone(), client.clone());
                info!(
                    "Tracking {} (chain id {}) via {}",
                    rpc.chain,
                    rpc.chain.chain_id(),
                    source.url()
                );
                Arc::new(source) as Arc<dyn FeeSource>
            })
            .collect();

        let price_source: Arc<dyn PriceSource> =
            Arc::new(CoinGeckoPriceSource::new(config.price.clone(), client));

        let poller_config = PollerConfig {
            tick_period: TICK_PERIOD,
            fetch_timeout: config.fetch_timeout(),
        };
        let poller = FeePoller::new(poller_config, Arc::clone(&store), fee_sources, price_source);

        let tracker = Self::new(store, poller);
        tracker.set_simulation_amount(&config.simulation_amount);
        Ok(tracker)
    }

    /// Get shared store reference
    pub fn store(&self) -> Arc<ChainStore> {
        Arc::clone(&self.store)
    }

    pub fn start(&self) {
        self.poller.start();
    }

    pub async fn stop(&self) {
        self.poller.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }

    /// Run one fetch cycle now, independent of the timer
    pub async fn tick(&self) -> CycleReport {
        self.poller.tick().await
    }

    pub fn chains(&self) -> Vec<ChainId> {
        self.store.chains()
    }

    pub fn get_chain_state(&self, chain: ChainId) -> CoreResult<Arc<ChainState>> {
        self.store
            .get_state(chain)
            .ok_or(CoreError::ChainNotConfigured(chain))
    }

    pub fn get_history(&self, chain: ChainId) -> CoreResult<Vec<GasSample>> {
        Ok(self.get_chain_state(chain)?.history().iter().copied().collect())
    }

    /// OHLC buckets over the chain's current history, recomputed on every call.
    /// Buckets are whole milliseconds, so the interval must be at least 1 ms.
    pub fn get_buckets(&self, chain: ChainId, interval: Duration) -> CoreResult<Vec<OhlcBucket>> {
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        if interval_ms == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "bucket interval {:?} is shorter than 1 ms",
                interval
            )));
        }

        let history = self.get_history(chain)?;
        Ok(bucketize(&history, interval_ms))
    }

    /// Last known good USD price, 0 before the first success
    pub fn get_usd_price(&self) -> f64 {
        self.store.usd_price()
    }

    pub fn set_simulation_amount(&self, amount: &str) {
        self.simulation.write().set_amount(amount);
    }

    pub fn set_mode(&self, mode: Mode) {
        self.simulation.write().mode = mode;
    }

    pub fn simulation(&self) -> SimulationParams {
        self.simulation.read().clone()
    }

    pub fn calculate_cost(&self, chain: ChainId, amount: f64) -> CoreResult<CostEstimate> {
        let state = self.get_chain_state(chain)?;
        Ok(calculate_cost(&state, self.get_usd_price(), amount))
    }

    /// Cost of the simulator's current amount on `chain`
    pub fn simulate_cost(&self, chain: ChainId) -> CoreResult<CostEstimate> {
        let amount = self.simulation.read().amount;
        self.calculate_cost(chain, amount)
    }

    /// Simulator amount priced on every configured chain
    pub fn compare_costs(&self) -> Vec<CostComparison> {
        let amount = self.simulation.read().amount;
        let usd_price = self.get_usd_price();
        let now_ms = self.poller.clock().now_ms();

        self.store
            .chains()
            .into_iter()
            .filter_map(|chain| {
                let state = self.store.get_state(chain)?;
                Some(CostComparison {
                    chain,
                    display_name: state.display_name.clone(),
                    connected: state.connected,
                    stale: state.is_stale(now_ms, STALE_AFTER_MS),
                    estimate: calculate_cost(&state, usd_price, amount),
                })
            })
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.store.connected_count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }
}
