//! Diskwatch Common - Shared utilities for diskwatch crates
//!
//! This crate provides the ambient functionality every diskwatch binary
//! and library needs:
//!
//! - **Initialization**: [`init_tracing`] for standardized logging setup
//! - **Errors**: [`LogResultExt`] for the "catch, log, carry on" pattern
//!   used by long-running cycles
//!
//! # Example
//!
//! ```rust,ignore
//! use diskwatch_common::{init_tracing, LogResultExt};
//!
//! init_tracing(&["diskwatch"], 0)?;
//!
//! // A failure here is logged with context and turned into `None`
//! let body = fetch().await.log_error("fetching disk space");
//! ```

pub mod error;
pub mod init;

// Re-export commonly used items at crate root
pub use error::LogResultExt;
pub use init::{default_level, init_tracing};
