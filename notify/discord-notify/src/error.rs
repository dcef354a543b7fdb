//! Error types for Discord delivery
//!
//! Distinguishes an unresolvable destination from other API failures so
//! callers can report "channel not found" separately from transport
//! problems.

use thiserror::Error;

/// Errors that can occur when talking to Discord
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The target channel (or webhook) does not exist or is not visible
    #[error("discord channel not found: {channel}")]
    ChannelNotFound {
        /// Channel id or redacted webhook URL
        channel: String,
    },

    /// The token was rejected or lacks permission for the channel
    #[error("discord rejected credentials ({status}): {body}")]
    Unauthorized {
        /// HTTP status returned by Discord
        status: u16,
        /// Response body returned by Discord
        body: String,
    },

    /// Any other non-success response
    #[error("discord API error ({status}): {body}")]
    Api {
        /// HTTP status returned by Discord
        status: u16,
        /// Response body returned by Discord
        body: String,
    },

    /// The request never got a response
    #[error("failed to reach discord: {0}")]
    Transport(#[from] reqwest::Error),

    /// Required destination settings are missing
    #[error("discord destination not configured: {0}")]
    NotConfigured(String),
}

/// Result type alias for Discord operations
pub type NotifyResult<T> = Result<T, NotifyError>;
