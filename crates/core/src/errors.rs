//! Error types

use std::time::Duration;
use thiserror::Error;

use crate::ChainId;

/// Core error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Chain {0} not configured")]
    ChainNotConfigured(ChainId),

    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Fee and price source errors.
///
/// Callers only distinguish success from failure; the variants exist for logs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
pub type FetchResult<T> = Result<T, FetchError>;
