//! Timelines and the cycles that run on them
//!
//! Each timeline owns its [`Snapshot`] and the store it persists to. A
//! cycle is fetch → decide → (deliver) → persist; nothing a cycle does can
//! fail the process, every error is logged and the next firing proceeds.

use std::sync::Arc;

use async_trait::async_trait;
use diskwatch_common::LogResultExt;

use crate::detect::{decide, Decision};
use crate::error::NotifyError;
use crate::fetch::{DiskSpaceFetcher, FetchOutcome};
use crate::notify::Notifier;
use crate::report::{format_change_report, format_daily_report, ReportKind};
use crate::scheduler::Job;
use crate::store::{SnapshotKind, SnapshotStore};
use crate::types::{Snapshot, VolumeReading};

/// What one cycle ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The API could not be reached or answered badly; snapshot untouched
    FetchFailed,
    /// Nothing matched the configured drives; snapshot untouched
    NoData,
    /// Readings persisted, no report due
    Unchanged,
    /// Report delivered and readings persisted
    Notified,
    /// Report due but delivery failed; readings persisted anyway
    DeliveryFailed,
}

/// One timeline's in-memory snapshot plus its backing file
#[derive(Debug)]
pub struct Timeline {
    store: SnapshotStore,
    snapshot: Snapshot,
}

impl Timeline {
    /// Load the timeline's snapshot, starting fresh if it cannot be read
    pub fn load(store: SnapshotStore) -> Self {
        let snapshot = store
            .load()
            .log_warn("Failed to load snapshot, starting fresh")
            .unwrap_or_default();
        Self { store, snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn kind(&self) -> SnapshotKind {
        self.store.kind()
    }

    /// Replace the readings, mark a successful delivery, and persist
    fn record(&mut self, readings: Vec<VolumeReading>, delivered: bool) {
        self.snapshot.readings = readings;
        if delivered {
            self.snapshot.has_sent_initial = true;
        }
        if self
            .store
            .save(&self.snapshot)
            .log_error("Failed to persist snapshot")
            .is_some()
        {
            tracing::debug!(
                timeline = ?self.kind(),
                initial_sent = self.snapshot.has_sent_initial,
                "Snapshot updated"
            );
        }
    }
}

/// Fetch readings, mapping failures and empty results to an outcome
async fn fetch_readings(
    fetcher: &DiskSpaceFetcher,
    kind: ReportKind,
) -> Result<Vec<VolumeReading>, CycleOutcome> {
    match fetcher.fetch().await {
        Ok(FetchOutcome::Readings(readings)) => Ok(readings),
        Ok(FetchOutcome::NoData) => {
            tracing::warn!(
                report = %kind,
                drives = fetcher.drives().len(),
                "No volumes matched the configured drives, skipping"
            );
            Err(CycleOutcome::NoData)
        }
        Err(e) => {
            tracing::error!(report = %kind, error = %e, "Failed to fetch disk space");
            Err(CycleOutcome::FetchFailed)
        }
    }
}

/// Deliver a rendered report, logging failures
async fn deliver(notifier: &dyn Notifier, kind: ReportKind, text: &str) -> CycleOutcome {
    match notifier.deliver(text).await {
        Ok(()) => {
            tracing::info!(report = %kind, notifier = notifier.name(), "Report sent");
            CycleOutcome::Notified
        }
        Err(NotifyError::ChannelNotFound { channel }) => {
            tracing::error!(report = %kind, channel = %channel, "Channel not found, report dropped");
            CycleOutcome::DeliveryFailed
        }
        Err(e) => {
            tracing::error!(report = %kind, error = %e, "Failed to deliver report");
            CycleOutcome::DeliveryFailed
        }
    }
}

/// The change-check cycle: report when something moved by 1 GB or more
pub struct ChangeCheck {
    timeline: Timeline,
    fetcher: Arc<DiskSpaceFetcher>,
    notifier: Arc<dyn Notifier>,
}

impl ChangeCheck {
    pub fn new(timeline: Timeline, fetcher: Arc<DiskSpaceFetcher>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            timeline,
            fetcher,
            notifier,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Run one change-check cycle
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        tracing::debug!("Checking for disk space changes");
        let readings = match fetch_readings(&self.fetcher, ReportKind::Change).await {
            Ok(readings) => readings,
            Err(outcome) => return outcome,
        };

        let snapshot = self.timeline.snapshot();
        let outcome = match decide(&readings, snapshot) {
            Decision::Unchanged => {
                tracing::info!("No significant disk space change");
                CycleOutcome::Unchanged
            }
            decision => {
                tracing::info!(?decision, "Sending change report");
                let text = format_change_report(&readings, &snapshot.readings);
                deliver(self.notifier.as_ref(), ReportKind::Change, &text).await
            }
        };

        self.timeline
            .record(readings, outcome == CycleOutcome::Notified);
        outcome
    }
}

#[async_trait]
impl Job for ChangeCheck {
    fn name(&self) -> &str {
        "change-check"
    }

    async fn run(&mut self) {
        self.run_cycle().await;
    }
}

/// The daily cycle: always report, comparing against the previous day
pub struct DailyReport {
    timeline: Timeline,
    fetcher: Arc<DiskSpaceFetcher>,
    notifier: Arc<dyn Notifier>,
}

impl DailyReport {
    pub fn new(timeline: Timeline, fetcher: Arc<DiskSpaceFetcher>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            timeline,
            fetcher,
            notifier,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Run one daily-report cycle
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        tracing::info!("Sending daily report");
        let readings = match fetch_readings(&self.fetcher, ReportKind::Daily).await {
            Ok(readings) => readings,
            Err(outcome) => return outcome,
        };

        let text = format_daily_report(&readings, &self.timeline.snapshot().readings);
        let outcome = deliver(self.notifier.as_ref(), ReportKind::Daily, &text).await;

        self.timeline
            .record(readings, outcome == CycleOutcome::Notified);
        outcome
    }
}

#[async_trait]
impl Job for DailyReport {
    fn name(&self) -> &str {
        "daily-report"
    }

    async fn run(&mut self) {
        self.run_cycle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, FetchResult, NotifyResult};
    use crate::fetch::{DiskSpaceSource, VolumeDescriptor};
    use crate::types::DriveConfig;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const GB: i64 = 1_073_741_824;

    struct FailingSource;

    #[async_trait]
    impl DiskSpaceSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn volumes(&self) -> FetchResult<Vec<VolumeDescriptor>> {
            Err(FetchError::Status {
                status: 503,
                body: String::new(),
            })
        }
    }

    struct FixedSource(Vec<VolumeDescriptor>);

    #[async_trait]
    impl DiskSpaceSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn volumes(&self) -> FetchResult<Vec<VolumeDescriptor>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct LostChannel {
        attempts: Mutex<usize>,
    }

    #[async_trait]
    impl Notifier for LostChannel {
        fn name(&self) -> &str {
            "lost"
        }

        async fn deliver(&self, _text: &str) -> NotifyResult<()> {
            *self.attempts.lock().unwrap() += 1;
            Err(NotifyError::ChannelNotFound {
                channel: "42".to_string(),
            })
        }
    }

    fn fetcher(source: impl DiskSpaceSource + 'static) -> Arc<DiskSpaceFetcher> {
        Arc::new(DiskSpaceFetcher::new(
            Arc::new(source),
            vec![DriveConfig::new("D:\\", "TV")],
        ))
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_snapshot_untouched() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Recent);
        let mut check = ChangeCheck::new(
            Timeline::load(store.clone()),
            fetcher(FailingSource),
            Arc::new(LostChannel::default()),
        );

        assert_eq!(check.run_cycle().await, CycleOutcome::FetchFailed);
        assert!(!store.path().exists());
        assert_eq!(check.timeline().snapshot(), &Snapshot::default());
    }

    #[tokio::test]
    async fn test_channel_not_found_persists_without_flag() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Daily);
        let notifier = Arc::new(LostChannel::default());
        let mut daily = DailyReport::new(
            Timeline::load(store.clone()),
            fetcher(FixedSource(vec![VolumeDescriptor {
                path: "D:\\".to_string(),
                free_space: 100 * GB,
                total_space: 200 * GB,
            }])),
            notifier.clone(),
        );

        assert_eq!(daily.run_cycle().await, CycleOutcome::DeliveryFailed);
        assert_eq!(*notifier.attempts.lock().unwrap(), 1);

        let persisted = store.load().unwrap();
        assert!(!persisted.has_sent_initial);
        assert_eq!(persisted.readings.len(), 1);
        assert_eq!(daily.timeline().kind(), SnapshotKind::Daily);
    }

    #[tokio::test]
    async fn test_unreadable_snapshot_starts_fresh() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be cannot be read as a file
        std::fs::create_dir(dir.path().join(SnapshotKind::Recent.file_name())).unwrap();
        let timeline = Timeline::load(SnapshotStore::new(dir.path(), SnapshotKind::Recent));
        assert_eq!(timeline.snapshot(), &Snapshot::default());
    }
}
