//! Core types and pure computations for the gas tracker
//!
//! This crate provides the pieces shared by the feed engine and the binary:
//! - Chain identifiers, fee snapshots and samples
//! - Per-chain state with a bounded history window
//! - OHLC bucketing and transfer cost estimates
//! - Configuration and error types

pub mod types;
pub mod fees;
pub mod samples;
pub mod ohlc;
pub mod cost;
pub mod simulation;
pub mod clock;
pub mod config;
pub mod errors;

pub use types::*;
pub use fees::*;
pub use samples::*;
pub use ohlc::*;
pub use cost::*;
pub use simulation::*;
pub use clock::*;
pub use config::*;
pub use errors::*;
