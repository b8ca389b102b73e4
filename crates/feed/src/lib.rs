//! Multi-chain gas fee engine
//!
//! Features:
//! - Concurrent polling of independent fee sources every tick
//! - Per-source timeouts and failure isolation
//! - Copy-on-write per-chain state with a bounded history window
//! - Last-known-good USD price retention
//! - Change notifications for observers

pub mod feeds;
pub mod poller;
pub mod state;
pub mod tracker;

pub use feeds::{CoinGeckoPriceSource, FeeSource, JsonRpcFeeSource, PriceSource};
pub use poller::{CycleReport, FeePoller, PollerConfig};
pub use state::{ChainStore, StoreEvent, StoreStats};
pub use tracker::{CostComparison, GasTracker};
