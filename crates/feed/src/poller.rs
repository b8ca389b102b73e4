//! Fee poller - drives periodic fetch cycles across all sources

use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use gas_core::{ChainId, Clock, FetchError, FetchResult, SystemClock, TICK_PERIOD};

use crate::feeds::{FeeSource, PriceSource};
use crate::state::ChainStore;

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub tick_period: Duration,
    /// Upper bound on any single fetch
    pub fetch_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            tick_period: TICK_PERIOD,
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of one fetch cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// One entry per fee source, `true` on success
    pub chains: Vec<(ChainId, bool)>,
    pub price_updated: bool,
}

impl CycleReport {
    pub fn succeeded(&self) -> usize {
        self.chains.iter().filter(|(_, ok)| *ok).count()
    }

    pub fn failed(&self) -> usize {
        self.chains.len() - self.succeeded()
    }
}

/// Everything one cycle needs; shared with spawned cycle tasks
struct FetchCycle {
    store: Arc<ChainStore>,
    fee_sources: Vec<Arc<dyn FeeSource>>,
    price_source: Arc<dyn PriceSource>,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
}

impl FetchCycle {
    /// Fetch every fee source and the price source concurrently, then wait
    /// for all of them to settle
    async fn run(&self) -> CycleReport {
        let start = Instant::now();

        let fee_fetches = self
            .fee_sources
            .iter()
            .map(|source| self.poll_fee_source(source.as_ref()));

        let (chains, price_updated) = tokio::join!(join_all(fee_fetches), self.poll_price_source());

        let report = CycleReport {
            chains,
            price_updated,
        };

        debug!(
            "Fetch cycle done in {:?}: {} ok, {} failed, price updated: {}",
            start.elapsed(),
            report.succeeded(),
            report.failed(),
            report.price_updated
        );

        report
    }

    async fn poll_fee_source(&self, source: &dyn FeeSource) -> (ChainId, bool) {
        let chain = source.chain();

        match with_timeout(self.fetch_timeout, source.fetch_fee_data()).await {
            Ok(snapshot) => {
                let base_fee = snapshot.base_fee_gwei();
                let priority_fee = snapshot.priority_fee_gwei();
                self.store
                    .apply_success(chain, base_fee, priority_fee, self.clock.now_ms());
                debug!(%chain, base_fee, priority_fee, "Fee update");
                (chain, true)
            }
            Err(e) => {
                warn!(%chain, error = %e, "Fee fetch failed");
                self.store.apply_failure(chain);
                (chain, false)
            }
        }
    }

    async fn poll_price_source(&self) -> bool {
        match with_timeout(self.fetch_timeout, self.price_source.fetch_usd_price()).await {
            Ok(price) => {
                self.store.apply_price(price, self.clock.now_ms());
                debug!(source = self.price_source.name(), price, "USD price update");
                true
            }
            Err(e) => {
                warn!(source = self.price_source.name(), error = %e, "Price fetch failed, keeping last price");
                self.store.record_price_failure();
                false
            }
        }
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fetch: impl std::future::Future<Output = FetchResult<T>>,
) -> FetchResult<T> {
    tokio::time::timeout(limit, fetch)
        .await
        .unwrap_or(Err(FetchError::Timeout(limit)))
}

/// Handles of a running timer task
struct Running {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodic poller writing fee and price results into a [`ChainStore`]
pub struct FeePoller {
    config: PollerConfig,
    cycle: Arc<FetchCycle>,
    running: Mutex<Option<Running>>,
}

impl FeePoller {
    pub fn new(
        config: PollerConfig,
        store: Arc<ChainStore>,
        fee_sources: Vec<Arc<dyn FeeSource>>,
        price_source: Arc<dyn PriceSource>,
    ) -> Self {
        Self::with_clock(config, store, fee_sources, price_source, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: PollerConfig,
        store: Arc<ChainStore>,
        fee_sources: Vec<Arc<dyn FeeSource>>,
        price_source: Arc<dyn PriceSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        for source in &fee_sources {
            if !store.contains(source.chain()) {
                warn!("Fee source for {} has no slot in the store, results are dropped", source.chain());
            }
        }

        let cycle = FetchCycle {
            store,
            fee_sources,
            price_source,
            clock,
            fetch_timeout: config.fetch_timeout,
        };

        Self {
            config,
            cycle: Arc::new(cycle),
            running: Mutex::new(None),
        }
    }

    /// Get shared store reference
    pub fn store(&self) -> Arc<ChainStore> {
        Arc::clone(&self.cycle.store)
    }

    /// Clock used to timestamp results
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.cycle.clock)
    }

    /// Run one fetch cycle inline
    pub async fn tick(&self) -> CycleReport {
        self.cycle.run().await
    }

    /// Start polling: one cycle right away, then one every tick period.
    ///
    /// Each cycle runs in its own task so a slow source never delays the next
    /// tick. Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut running = self.running.lock();
        if running.is_some() {
            warn!("Fee poller already running");
            return;
        }

        info!(
            "Starting fee poller: {} sources, period {:?}, timeout {:?}",
            self.cycle.fee_sources.len(),
            self.config.tick_period,
            self.config.fetch_timeout
        );

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let cycle = Arc::clone(&self.cycle);
        let period = self.config.tick_period;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let cycle = Arc::clone(&cycle);
                        tokio::spawn(async move {
                            cycle.run().await;
                        });
                    }
                    _ = &mut shutdown_rx => {
                        debug!("Fee poller timer stopped");
                        break;
                    }
                }
            }
        });

        *running = Some(Running {
            shutdown: shutdown_tx,
            handle,
        });
    }

    /// Stop scheduling new cycles. Cycles already in flight finish and apply
    /// their results; no cycle starts after this returns.
    pub async fn stop(&self) {
        let running = self.running.lock().take();
        let Some(running) = running else {
            return;
        };

        info!("Stopping fee poller");
        let _ = running.shutdown.send(());

        if let Err(e) = running.handle.await {
            if !e.is_cancelled() {
                error!("Fee poller timer task failed: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }
}

impl Drop for FeePoller {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.handle.abort();
        }
    }
}
