//! Snapshot persistence
//!
//! Each timeline owns one JSON file, overwritten wholly after every cycle
//! that fetched data:
//!
//! ```json
//! { "hasSentInitialPost": true, "diskSpace": [ { "label": "TV", "freeSpaceGB": "100.00", ... } ] }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::types::{Snapshot, VolumeReading};

/// Which timeline a snapshot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// The change-check timeline
    Recent,
    /// The daily report timeline
    Daily,
}

impl SnapshotKind {
    pub fn file_name(self) -> &'static str {
        match self {
            SnapshotKind::Recent => "diskSpace30Min.json",
            SnapshotKind::Daily => "diskSpaceDaily.json",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentDocument<'a> {
    has_sent_initial_post: bool,
    disk_space: &'a [VolumeReading],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailyDocument<'a> {
    has_sent_initial_daily_report: bool,
    disk_space: &'a [VolumeReading],
}

/// On-disk shape accepted when loading either kind
#[derive(Debug, Deserialize)]
struct StoredDocument {
    #[serde(
        rename = "hasSentInitialPost",
        alias = "hasSentInitialDailyReport",
        default
    )]
    has_sent_initial: bool,
    #[serde(rename = "diskSpace", default)]
    disk_space: Option<Vec<VolumeReading>>,
}

/// JSON file store for one timeline's snapshot
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    kind: SnapshotKind,
}

impl SnapshotStore {
    /// Store for `kind` inside `dir`
    pub fn new(dir: &Path, kind: SnapshotKind) -> Self {
        Self {
            path: dir.join(kind.file_name()),
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    /// Load the snapshot, starting fresh if the file is absent
    ///
    /// A file that exists but does not parse is moved aside to
    /// `<name>.corrupt` and an empty snapshot is returned.
    pub fn load(&self) -> StoreResult<Snapshot> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No snapshot found, starting fresh");
                return Ok(Snapshot::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<StoredDocument>(&content) {
            Ok(doc) => {
                let snapshot = Snapshot {
                    has_sent_initial: doc.has_sent_initial,
                    readings: doc.disk_space.unwrap_or_default(),
                };
                tracing::debug!(
                    path = %self.path.display(),
                    volumes = snapshot.readings.len(),
                    initial_sent = snapshot.has_sent_initial,
                    "Loaded snapshot"
                );
                Ok(snapshot)
            }
            Err(e) => {
                let aside = self.path.with_extension("json.corrupt");
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "Snapshot is malformed, starting fresh"
                );
                std::fs::rename(&self.path, &aside).map_err(|source| StoreError::Io {
                    path: self.path.clone(),
                    source,
                })?;
                Ok(Snapshot::default())
            }
        }
    }

    /// Overwrite the file with `snapshot`
    ///
    /// Writes to a temporary sibling first and renames it into place, so a
    /// crash mid-write never leaves a truncated snapshot.
    pub fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let encoded = match self.kind {
            SnapshotKind::Recent => serde_json::to_string(&RecentDocument {
                has_sent_initial_post: snapshot.has_sent_initial,
                disk_space: &snapshot.readings,
            }),
            SnapshotKind::Daily => serde_json::to_string(&DailyDocument {
                has_sent_initial_daily_report: snapshot.has_sent_initial,
                disk_space: &snapshot.readings,
            }),
        }
        .map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "Snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn readings() -> Vec<VolumeReading> {
        vec![
            VolumeReading::from_bytes("TV", 107_374_182_400, 214_748_364_800),
            VolumeReading::from_bytes("Movies", 5_368_709_120, 10_737_418_240),
        ]
    }

    #[test]
    fn test_absent_file_is_default() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Recent);
        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn test_round_trip_recent() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Recent);
        let snapshot = Snapshot {
            has_sent_initial: true,
            readings: readings(),
        };
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), snapshot);
    }

    #[test]
    fn test_round_trip_daily() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Daily);
        let snapshot = Snapshot {
            has_sent_initial: false,
            readings: readings(),
        };
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), snapshot);
    }

    #[test]
    fn test_written_shape_per_kind() {
        let dir = TempDir::new().unwrap();
        let snapshot = Snapshot {
            has_sent_initial: true,
            readings: readings(),
        };

        let recent = SnapshotStore::new(dir.path(), SnapshotKind::Recent);
        recent.save(&snapshot).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(recent.path()).unwrap()).unwrap();
        assert_eq!(value["hasSentInitialPost"], true);
        assert_eq!(value["diskSpace"][0]["freeSpaceGB"], "100.00");

        let daily = SnapshotStore::new(dir.path(), SnapshotKind::Daily);
        daily.save(&snapshot).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(daily.path()).unwrap()).unwrap();
        assert_eq!(value["hasSentInitialDailyReport"], true);
        assert!(value.get("hasSentInitialPost").is_none());
    }

    #[test]
    fn test_save_overwrites_wholly() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Recent);
        store
            .save(&Snapshot {
                has_sent_initial: true,
                readings: readings(),
            })
            .unwrap();
        let replacement = Snapshot {
            has_sent_initial: true,
            readings: vec![VolumeReading::from_bytes("Only", 1, 2)],
        };
        store.save(&replacement).unwrap();
        assert_eq!(store.load().unwrap(), replacement);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_loads_legacy_string_format() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Daily);
        std::fs::write(
            store.path(),
            r#"{"hasSentInitialDailyReport":true,"diskSpace":[{"label":"TV","freeSpaceGB":"100.00","totalSpaceGB":"200.00","remainingPercent":"50.00"}]}"#,
        )
        .unwrap();
        let snapshot = store.load().unwrap();
        assert!(snapshot.has_sent_initial);
        assert_eq!(snapshot.readings[0].free_space_gb, 100.0);
    }

    #[test]
    fn test_missing_disk_space_key() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Daily);
        std::fs::write(store.path(), r#"{"hasSentInitialDailyReport":true}"#).unwrap();
        let snapshot = store.load().unwrap();
        assert!(snapshot.has_sent_initial);
        assert!(snapshot.readings.is_empty());
    }

    #[test]
    fn test_malformed_file_moved_aside() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path(), SnapshotKind::Recent);
        std::fs::write(store.path(), "{not json").unwrap();

        assert_eq!(store.load().unwrap(), Snapshot::default());
        assert!(!store.path().exists());
        let aside = dir.path().join("diskSpace30Min.json.corrupt");
        assert_eq!(std::fs::read_to_string(aside).unwrap(), "{not json");
    }

    #[test]
    fn test_save_creates_state_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("state").join("diskwatch");
        let store = SnapshotStore::new(&nested, SnapshotKind::Recent);
        store.save(&Snapshot::default()).unwrap();
        assert!(store.path().exists());
    }
}
