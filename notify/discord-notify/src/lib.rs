//! Discord Notify Library
//!
//! Delivers plain-text messages to a single Discord destination, either a
//! channel addressed by id through a bot token, or a webhook URL.
//!
//! # Usage
//!
//! ```rust,ignore
//! use discord_notify::DiscordClient;
//!
//! let client = DiscordClient::bot(token, channel_id)?;
//! client.login().await?;
//! client.send("**Change Report:**\nTV: 100.00GB (50.00% Left, No change)").await?;
//! ```

pub mod client;
pub mod error;
pub mod payload;

pub use client::{split_message, DiscordClient, Destination, DISCORD_API_BASE, MESSAGE_LIMIT};
pub use error::{NotifyError, NotifyResult};
pub use payload::CurrentUser;
