//! Configuration loading
//!
//! Configuration is loaded from:
//! 1. `--config` / `DISKWATCH_CONFIG`
//! 2. `diskwatch.toml` in the current directory or any parent
//! 3. `~/.config/diskwatch/diskwatch.toml`
//! 4. Default values
//!
//! Secrets and endpoints can then be overridden from the environment
//! (`DISKWATCH_API_URL`, `DISKWATCH_API_KEY`, `DISCORD_BOT_TOKEN`,
//! `DISCORD_CHANNEL_ID`, `DISCORD_WEBHOOK_URL`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::scheduler::Schedule;
use crate::types::DriveConfig;

/// Config file name searched for on disk
pub const CONFIG_FILE_NAME: &str = "diskwatch.toml";

/// Minutes in a day; the check interval must divide it evenly
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/diskwatch/
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("diskwatch").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Top-level configuration (from diskwatch.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub state: StateConfig,
    /// Drives to monitor, in priority order for overlapping prefixes
    #[serde(default)]
    pub drives: Vec<DriveConfig>,
}

/// Disk space API section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Sonarr/Radarr instance
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Static API key sent as `X-Api-Key`
    #[serde(default)]
    pub key: String,
    /// Path appended to `url`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

/// Discord destination section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token (used with `channel_id`)
    #[serde(default)]
    pub token: Option<String>,
    /// Channel the bot posts to
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Webhook URL, used instead of a bot when set
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Display name for webhook messages
    #[serde(default = "default_username")]
    pub username: String,
}

/// Scheduling section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Change-check period; checks align to multiples of this since midnight
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u32,
    /// Local time of the daily report, `HH:MM` or `HH:MM:SS`
    #[serde(default = "default_report_time")]
    pub report_time: String,
}

/// Persisted state section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory holding the snapshot files
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
}

// Default value functions
fn default_api_url() -> String {
    "http://localhost:8989".to_string()
}

fn default_endpoint() -> String {
    "/api/v3/diskspace".to_string()
}

fn default_username() -> String {
    "diskwatch".to_string()
}

fn default_check_interval() -> u32 {
    30
}

fn default_report_time() -> String {
    "20:00:00".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            key: String::new(),
            endpoint: default_endpoint(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            channel_id: None,
            webhook_url: None,
            username: default_username(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: default_check_interval(),
            report_time: default_report_time(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
        }
    }
}

/// Where notifications go, resolved from [`DiscordConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscordTarget {
    Webhook { url: String },
    Bot { token: String, channel_id: String },
}

impl Config {
    /// Load configuration from an explicit path, a discovered file, or
    /// defaults
    ///
    /// Returns the config and the file it came from, if any.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(CONFIG_FILE_NAME),
        };

        match path {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                let config = Self::load_from_path(&path)?;
                Ok((config, Some(path)))
            }
            None => {
                tracing::info!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok((Self::default(), None))
            }
        }
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment, tests)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("DISKWATCH_API_URL") {
            self.api.url = url;
        }
        if let Some(key) = lookup("DISKWATCH_API_KEY") {
            self.api.key = key;
        }
        if let Some(token) = lookup("DISCORD_BOT_TOKEN") {
            self.discord.token = Some(token);
        }
        if let Some(channel_id) = lookup("DISCORD_CHANNEL_ID") {
            self.discord.channel_id = Some(channel_id);
        }
        if let Some(webhook_url) = lookup("DISCORD_WEBHOOK_URL") {
            self.discord.webhook_url = Some(webhook_url);
        }
    }

    /// Check the config is usable before anything is started
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api.url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.url must not be empty".to_string()));
        }
        reqwest::Url::parse(&self.api.url)
            .map_err(|e| ConfigError::Invalid(format!("api.url {:?}: {}", self.api.url, e)))?;
        if self.api.key.trim().is_empty() {
            tracing::warn!("api.key is empty; the disk space API will likely reject requests");
        }

        if self.drives.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[drives]] entry is required".to_string(),
            ));
        }
        let mut aliases = HashSet::new();
        for drive in &self.drives {
            if drive.path.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "drive {:?} has an empty path",
                    drive.alias
                )));
            }
            if drive.alias.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "drive {:?} has an empty alias",
                    drive.path
                )));
            }
            if !aliases.insert(drive.alias.as_str()) {
                tracing::warn!(alias = %drive.alias, "Duplicate drive alias; reports may be ambiguous");
            }
        }

        self.discord_target()?;
        self.change_schedule()?;
        self.daily_schedule()?;
        Ok(())
    }

    /// Resolve the Discord destination; a webhook takes precedence
    pub fn discord_target(&self) -> ConfigResult<DiscordTarget> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        if let Some(url) = non_empty(&self.discord.webhook_url) {
            return Ok(DiscordTarget::Webhook { url });
        }
        match (non_empty(&self.discord.token), non_empty(&self.discord.channel_id)) {
            (Some(token), Some(channel_id)) => Ok(DiscordTarget::Bot { token, channel_id }),
            (Some(_), None) => Err(ConfigError::Invalid(
                "discord.channel_id is required with a bot token".to_string(),
            )),
            _ => Err(ConfigError::Invalid(
                "set discord.token and discord.channel_id, or discord.webhook_url".to_string(),
            )),
        }
    }

    /// Schedule for the change-check timeline
    pub fn change_schedule(&self) -> ConfigResult<Schedule> {
        let minutes = self.schedule.check_interval_minutes;
        if minutes == 0 || minutes > MINUTES_PER_DAY || MINUTES_PER_DAY % minutes != 0 {
            return Err(ConfigError::Invalid(format!(
                "schedule.check_interval_minutes must divide {} evenly, got {}",
                MINUTES_PER_DAY, minutes
            )));
        }
        Ok(Schedule::Aligned { minutes })
    }

    /// Schedule for the daily report timeline
    pub fn daily_schedule(&self) -> ConfigResult<Schedule> {
        let time = parse_report_time(&self.schedule.report_time)?;
        Ok(Schedule::DailyAt { time })
    }
}

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_report_time(value: &str) -> ConfigResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            ConfigError::Invalid(format!(
                "schedule.report_time {:?} is not HH:MM or HH:MM:SS",
                value
            ))
        })
}
