use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use diskwatch::cli::Cli;
use diskwatch::config::Config;
use diskwatch::fetch::{ArrClient, DiskSpaceFetcher};
use diskwatch::monitor::{Monitor, MonitorConfig};
use diskwatch::notify::discord_client;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    diskwatch_common::init_tracing(&["diskwatch", "discord_notify", "diskwatch_common"], cli.verbose)?;

    let (mut config, source) = Config::load(cli.config.as_deref())?;
    config.apply_env();
    if let Some(dir) = cli.state_dir {
        config.state.dir = dir;
    }
    config.validate().with_context(|| match &source {
        Some(path) => format!("invalid configuration in {}", path.display()),
        None => "invalid configuration (no diskwatch.toml found)".to_string(),
    })?;

    let target = config.discord_target()?;
    let discord = discord_client(&target, &config.discord.username)?;
    discord.login().await.context("Discord login failed")?;

    let arr = ArrClient::new(config.api.clone())?;
    let fetcher = DiskSpaceFetcher::new(Arc::new(arr), config.drives.clone());

    let monitor_config = MonitorConfig {
        state_dir: config.state.dir.clone(),
        change_schedule: config.change_schedule()?,
        daily_schedule: config.daily_schedule()?,
        once: cli.once,
    };
    tracing::info!(
        drives = config.drives.len(),
        api = %config.api.url,
        destination = %discord.destination().describe(),
        "diskwatch starting"
    );

    Monitor::new(monitor_config, fetcher, Arc::new(discord)).run().await
}
