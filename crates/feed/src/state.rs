//! Per-chain fee state shared between the poller and readers
//!
//! Each chain owns its own lock, so writes to one chain never contend with
//! reads or writes of another. Records are copy-on-write: a snapshot handed
//! to a reader is never modified afterwards.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use gas_core::{ChainId, ChainState};

/// Capacity of the change notification channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Change notifications for observers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEvent {
    ChainUpdated(ChainId),
    ChainFailed(ChainId),
    PriceUpdated(f64),
}

/// Last known good USD price
#[derive(Debug, Clone, Copy, Default)]
struct PriceQuote {
    usd_per_native_unit: f64,
    updated_at: u64,
}

/// Fee state for every configured chain plus the native asset price
#[derive(Debug)]
pub struct ChainStore {
    /// Fixed at construction; only the slots themselves are mutated
    chains: HashMap<ChainId, RwLock<Arc<ChainState>>>,
    price: RwLock<PriceQuote>,
    events: broadcast::Sender<StoreEvent>,

    /// Stats
    update_count: AtomicU64,
    failure_count: AtomicU64,
    price_update_count: AtomicU64,
    price_failure_count: AtomicU64,
}

impl ChainStore {
    pub fn new(chains: impl IntoIterator<Item = ChainId>) -> Self {
        let chains = chains
            .into_iter()
            .map(|chain| (chain, RwLock::new(Arc::new(ChainState::new(chain)))))
            .collect();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            chains,
            price: RwLock::new(PriceQuote::default()),
            events,
            update_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            price_update_count: AtomicU64::new(0),
            price_failure_count: AtomicU64::new(0),
        }
    }

    /// Configured chains in a stable order
    pub fn chains(&self) -> Vec<ChainId> {
        let mut chains: Vec<ChainId> = self.chains.keys().copied().collect();
        chains.sort();
        chains
    }

    pub fn contains(&self, chain: ChainId) -> bool {
        self.chains.contains_key(&chain)
    }

    /// Snapshot of one chain's state
    pub fn get_state(&self, chain: ChainId) -> Option<Arc<ChainState>> {
        self.chains.get(&chain).map(|slot| slot.read().clone())
    }

    /// Record a successful fee fetch. Unknown chains are ignored.
    pub fn apply_success(&self, chain: ChainId, base_fee: f64, priority_fee: f64, now_ms: u64) {
        let Some(slot) = self.chains.get(&chain) else {
            return;
        };

        {
            let mut record = slot.write();
            Arc::make_mut(&mut *record).record_success(base_fee, priority_fee, now_ms);
        }

        self.update_count.fetch_add(1, Ordering::Relaxed);
        self.publish(StoreEvent::ChainUpdated(chain));
    }

    /// Record a failed fee fetch. Fees and history are left as they were.
    pub fn apply_failure(&self, chain: ChainId) {
        let Some(slot) = self.chains.get(&chain) else {
            return;
        };

        {
            let mut record = slot.write();
            if record.connected {
                Arc::make_mut(&mut *record).record_failure();
            }
        }

        self.failure_count.fetch_add(1, Ordering::Relaxed);
        self.publish(StoreEvent::ChainFailed(chain));
    }

    /// Replace the retained USD price
    pub fn apply_price(&self, usd_per_native_unit: f64, now_ms: u64) {
        *self.price.write() = PriceQuote {
            usd_per_native_unit,
            updated_at: now_ms,
        };

        self.price_update_count.fetch_add(1, Ordering::Relaxed);
        self.publish(StoreEvent::PriceUpdated(usd_per_native_unit));
    }

    /// Count a failed price fetch; the retained price stays as it is
    pub fn record_price_failure(&self) {
        self.price_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Last known good USD price, 0 before the first success
    pub fn usd_price(&self) -> f64 {
        self.price.read().usd_per_native_unit
    }

    /// Time of the last price update, 0 if never
    pub fn price_updated_at(&self) -> u64 {
        self.price.read().updated_at
    }

    pub fn connected_count(&self) -> usize {
        self.chains
            .values()
            .filter(|slot| slot.read().connected)
            .count()
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Change notifications as a stream. Lagging consumers see a `Lagged` error item.
    pub fn updates(&self) -> BroadcastStream<StoreEvent> {
        BroadcastStream::new(self.subscribe())
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Stats
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            chain_count: self.chains.len(),
            connected_count: self.connected_count(),
            update_count: self.update_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            price_update_count: self.price_update_count.load(Ordering::Relaxed),
            price_failure_count: self.price_failure_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new(ChainId::ALL)
    }
}

/// Statistics about the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub chain_count: usize,
    pub connected_count: usize,
    pub update_count: u64,
    pub failure_count: u64,
    pub price_update_count: u64,
    pub price_failure_count: u64,
}
