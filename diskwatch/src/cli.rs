//! CLI argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "diskwatch")]
#[command(about = "Watch Sonarr/Radarr disk space and report changes to Discord")]
#[command(version)]
pub struct Cli {
    /// Config file (default: diskwatch.toml in this or a parent directory,
    /// then ~/.config/diskwatch/diskwatch.toml)
    #[arg(short, long, env = "DISKWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for snapshot files (overrides [state] dir)
    #[arg(long, env = "DISKWATCH_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Run one change check and one daily report, then exit
    #[arg(long)]
    pub once: bool,

    /// Increase verbosity (-v debug, -vv trace). Default is info.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
