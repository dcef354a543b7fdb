//! Monitor module for scheduled disk space checks
//!
//! This module wires the two timelines together:
//! - The change check runs once at startup, then on every aligned boundary
//! - The daily report runs at the configured time of day
//!
//! Each timeline owns its snapshot; they share only the fetcher and the
//! notifier, which are stateless.

mod timeline;

pub use timeline::{ChangeCheck, CycleOutcome, DailyReport, Timeline};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::fetch::DiskSpaceFetcher;
use crate::notify::Notifier;
use crate::scheduler::{Clock, RecurringTask, Schedule, SystemClock};
use crate::store::{SnapshotKind, SnapshotStore};

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Directory holding the snapshot files
    pub state_dir: PathBuf,
    /// When change checks fire
    pub change_schedule: Schedule,
    /// When the daily report fires
    pub daily_schedule: Schedule,
    /// Run one cycle of each timeline and return
    pub once: bool,
}

/// The Monitor struct that owns the shared components and runs the timelines
pub struct Monitor {
    config: MonitorConfig,
    fetcher: Arc<DiskSpaceFetcher>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl Monitor {
    /// Create a new Monitor with the given configuration
    pub fn new(config: MonitorConfig, fetcher: DiskSpaceFetcher, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            notifier,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock (tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Load both timelines from the state directory
    pub fn jobs(&self) -> (ChangeCheck, DailyReport) {
        let recent = Timeline::load(SnapshotStore::new(&self.config.state_dir, SnapshotKind::Recent));
        let daily = Timeline::load(SnapshotStore::new(&self.config.state_dir, SnapshotKind::Daily));
        (
            ChangeCheck::new(recent, self.fetcher.clone(), self.notifier.clone()),
            DailyReport::new(daily, self.fetcher.clone(), self.notifier.clone()),
        )
    }

    /// Run the monitor (once or until Ctrl-C based on config)
    pub async fn run(&self) -> Result<()> {
        if self.config.once {
            self.run_once().await;
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl-C, shutting down");
                    on_signal.cancel();
                }
                Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });

        self.run_until(cancel).await
    }

    /// Run a single cycle of each timeline
    pub async fn run_once(&self) -> (CycleOutcome, CycleOutcome) {
        let (mut change, mut daily) = self.jobs();
        let change_outcome = change.run_cycle().await;
        let daily_outcome = daily.run_cycle().await;
        tracing::info!(
            change = ?change_outcome,
            daily = ?daily_outcome,
            "Single run complete"
        );
        (change_outcome, daily_outcome)
    }

    /// Run both timelines until `cancel` fires
    ///
    /// The change check runs immediately, then both recurring tasks are
    /// started. Returns once both tasks have finished their in-flight cycle.
    pub async fn run_until(&self, cancel: CancellationToken) -> Result<()> {
        let (mut change, daily) = self.jobs();

        tracing::info!("Running initial change check");
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cancelled during initial change check");
                return Ok(());
            }
            _ = change.run_cycle() => {}
        }

        tracing::info!(
            change = %self.config.change_schedule,
            daily = %self.config.daily_schedule,
            state_dir = %self.config.state_dir.display(),
            "Starting scheduled monitoring"
        );
        let change_task = RecurringTask::new(
            change,
            self.config.change_schedule,
            self.clock.clone(),
            cancel.clone(),
        )
        .spawn();
        let daily_task = RecurringTask::new(
            daily,
            self.config.daily_schedule,
            self.clock.clone(),
            cancel.clone(),
        )
        .spawn();

        let (change_result, daily_result) = tokio::join!(change_task, daily_task);
        change_result?;
        daily_result?;

        tracing::info!("Monitor stopped");
        Ok(())
    }
}
