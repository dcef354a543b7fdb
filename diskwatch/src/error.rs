//! Error types for diskwatch components
//!
//! Each component boundary has its own error enum. None of these escape a
//! running cycle: the cycle runner logs them and waits for the next firing.

use std::path::PathBuf;

use thiserror::Error;

pub use discord_notify::{NotifyError, NotifyResult};

/// Errors fetching disk space from the remote API
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the connection failed
    #[error("disk space request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("disk space API returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not the expected JSON shape
    #[error("failed to decode disk space response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors loading or persisting snapshot files
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading, writing or renaming the file failed
    #[error("snapshot I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded
    #[error("failed to encode snapshot for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for snapshot store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for our schema
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is missing or out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
