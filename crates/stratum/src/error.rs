//! # Stratum Error Types
//!
//! Failures of the outer layer: configuration, request validation and the
//! worker boundary. The core stages never fail.

use thiserror::Error;

/// Errors that can occur while configuring or driving the pipeline.
#[derive(Error, Debug)]
pub enum StratumError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`WorldConfig`](crate::WorldConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML.
    #[error("failed to render config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration or request values out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The generation worker thread is gone.
    #[error("generation worker disconnected")]
    WorkerDisconnected,
}

/// Result type for pipeline operations.
pub type StratumResult<T> = Result<T, StratumError>;
