//! Disk space monitor for Sonarr/Radarr with Discord reports
//!
//! Polls the `*arr` disk space endpoint, announces free-space changes of
//! 1 GB or more on an aligned schedule, and posts a daily summary.

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod fetch;
pub mod monitor;
pub mod notify;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod types;

pub use config::Config;
pub use monitor::{CycleOutcome, Monitor, MonitorConfig};
pub use types::{DriveConfig, Snapshot, VolumeReading};
