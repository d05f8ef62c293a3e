//! ripplectl: control-plane coordinator for a distributed web crawler.
//!
//! This crate owns the frontier (pending URL queue), the visited index,
//! per-domain politeness state, and the lifecycle of named crawl runs.
//! Stateless worker processes fetch pages and report results back through
//! the HTTP surface in [`api`]; the coordinator decides what to crawl next.

pub mod api;
pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod frontier;
pub mod persistence;
pub mod registry;
pub mod run;

use thiserror::Error;

/// Crate-wide error type for coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("configuration {0} not found")]
    ConfigNotFound(String),

    #[error("configuration {0} is in use by a running run")]
    ConfigInUse(String),

    #[error("run is already running")]
    RunAlreadyRunning,

    #[error("run is not running")]
    RunNotRunning,

    #[error("run has already completed")]
    RunCompleted,

    #[error("invalid run state for this transition")]
    InvalidRunState,

    #[error("frontier is at capacity")]
    QueueFull,

    #[error("content not found: {0}")]
    ContentNotFound(String),

    #[error("url error: {0}")]
    Url(#[from] UrlError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] persistence::StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid regex pattern: {0}")]
    InvalidPattern(String),
}

/// URL parsing/normalization errors (spec §4.1).
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("failed to parse url: {0}")]
    Parse(String),

    #[error("unsupported url scheme: {0}")]
    InvalidScheme(String),

    #[error("url has no host")]
    MissingHost,
}

/// Result type alias for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations.
pub type UrlResult<T> = std::result::Result<T, UrlError>;
