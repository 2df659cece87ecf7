//! Error types shared across the alert engine.

use thiserror::Error;

/// Failure talking to the subscription store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("store backend: {0}")]
    Backend(String),
}

/// Errors surfaced by the subscription manager and the breach detector.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("'{0}' is not a valid symbol")]
    InvalidSymbol(String),

    #[error("target price must be a positive number")]
    InvalidPrice,

    #[error("subscription store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Startup configuration problems. These are the only errors allowed to stop the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown quote provider '{0}'")]
    UnknownProvider(String),

    #[error("unknown store backend '{0}'")]
    UnknownStore(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
