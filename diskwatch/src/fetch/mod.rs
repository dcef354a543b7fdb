//! Disk space fetching
//!
//! This module provides a trait-based abstraction over where volume data
//! comes from ([`DiskSpaceSource`]) and the filtering and mapping that turns
//! raw volume descriptors into labelled [`VolumeReading`]s.
//! Currently supports the Sonarr/Radarr (`*arr`) disk space endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchResult;
use crate::types::{DriveConfig, VolumeReading};

pub mod arr;

pub use arr::ArrClient;

/// A volume as reported by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDescriptor {
    pub path: String,
    pub free_space: i64,
    pub total_space: i64,
}

/// Trait for disk space sources
#[async_trait]
pub trait DiskSpaceSource: Send + Sync {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Fetch every volume the source knows about, in source order
    async fn volumes(&self) -> FetchResult<Vec<VolumeDescriptor>>;
}

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// At least one configured drive matched
    Readings(Vec<VolumeReading>),
    /// The API answered, but nothing matched the configured drives
    NoData,
}

/// Fetches volumes and keeps only the configured drives
#[derive(Clone)]
pub struct DiskSpaceFetcher {
    source: Arc<dyn DiskSpaceSource>,
    drives: Vec<DriveConfig>,
}

impl DiskSpaceFetcher {
    pub fn new(source: Arc<dyn DiskSpaceSource>, drives: Vec<DriveConfig>) -> Self {
        Self { source, drives }
    }

    pub fn drives(&self) -> &[DriveConfig] {
        &self.drives
    }

    /// Fetch and derive readings for the configured drives
    pub async fn fetch(&self) -> FetchResult<FetchOutcome> {
        tracing::debug!(source = self.source.name(), "Fetching disk space");
        let volumes = self.source.volumes().await?;
        tracing::debug!(count = volumes.len(), "Disk space response received");

        let readings = select_readings(&volumes, &self.drives);
        if readings.is_empty() {
            return Ok(FetchOutcome::NoData);
        }

        for reading in &readings {
            tracing::debug!(
                label = %reading.label,
                free_gb = reading.free_space_gb,
                total_gb = reading.total_space_gb,
                percent = reading.remaining_percent,
                "Fetched volume"
            );
        }
        Ok(FetchOutcome::Readings(readings))
    }
}

/// Keep the volumes whose path starts with a configured drive path
///
/// Output order follows `volumes`; each kept volume is labelled with the
/// alias of the first drive whose path is a prefix of it.
pub fn select_readings(volumes: &[VolumeDescriptor], drives: &[DriveConfig]) -> Vec<VolumeReading> {
    volumes
        .iter()
        .filter_map(|volume| {
            drives
                .iter()
                .find(|drive| drive.matches(&volume.path))
                .map(|drive| {
                    VolumeReading::from_bytes(&drive.alias, volume.free_space, volume.total_space)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(path: &str, free: i64, total: i64) -> VolumeDescriptor {
        VolumeDescriptor {
            path: path.to_string(),
            free_space: free,
            total_space: total,
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

    #[test]
    fn test_descriptor_decodes_api_shape() {
        let json = r#"[{"path":"D:\\","label":"Data","freeSpace":107374182400,"totalSpace":214748364800}]"#;
        let volumes: Vec<VolumeDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(volumes, vec![volume("D:\\", 107_374_182_400, 214_748_364_800)]);
    }

    #[test]
    fn test_single_drive_scenario() {
        let drives = vec![DriveConfig::new("D:\\", "TV")];
        let readings = select_readings(&[volume("D:\\", 107_374_182_400, 214_748_364_800)], &drives);
        assert_eq!(
            readings,
            vec![VolumeReading {
                label: "TV".to_string(),
                free_space_gb: 100.0,
                total_space_gb: 200.0,
                remaining_percent: 50.0,
            }]
        );
    }

    #[test]
    fn test_unconfigured_volumes_are_dropped() {
        let drives = vec![DriveConfig::new("/mnt/tv", "TV"), DriveConfig::new("/mnt/movies", "Movies")];
        let volumes = vec![
            volume("/", 1, 2),
            volume("/mnt/movies", 1, 2),
            volume("/boot", 1, 2),
            volume("/mnt/tv", 1, 2),
        ];
        let readings = select_readings(&volumes, &drives);
        let labels: Vec<&str> = readings.iter().map(|r| r.label.as_str()).collect();
        // API order, not config order
        assert_eq!(labels, vec!["Movies", "TV"]);
        assert!(readings
            .iter()
            .all(|r| drives.iter().any(|d| d.alias == r.label)));
    }

    #[test]
    fn test_first_matching_drive_wins() {
        let drives = vec![
            DriveConfig::new("/mnt", "All mounts"),
            DriveConfig::new("/mnt/tv", "TV"),
        ];
        let readings = select_readings(&[volume("/mnt/tv", 1, 2)], &drives);
        assert_eq!(readings[0].label, "All mounts");

        let reversed: Vec<DriveConfig> = drives.into_iter().rev().collect();
        let readings = select_readings(&[volume("/mnt/tv", 1, 2)], &reversed);
        assert_eq!(readings[0].label, "TV");
    }

    #[tokio::test]
    async fn test_fetch_no_match_is_no_data() {
        let source = Arc::new(FixedSource(vec![volume("/", 1, 2)]));
        let fetcher = DiskSpaceFetcher::new(source, vec![DriveConfig::new("D:\\", "TV")]);
        assert_eq!(fetcher.fetch().await.unwrap(), FetchOutcome::NoData);
    }

    #[tokio::test]
    async fn test_fetch_empty_response_is_no_data() {
        let fetcher = DiskSpaceFetcher::new(
            Arc::new(FixedSource(Vec::new())),
            vec![DriveConfig::new("D:\\", "TV")],
        );
        assert_eq!(fetcher.fetch().await.unwrap(), FetchOutcome::NoData);
    }

    #[tokio::test]
    async fn test_fetch_returns_readings() {
        let source = Arc::new(FixedSource(vec![volume("E:\\", 0, 1)]));
        let fetcher = DiskSpaceFetcher::new(source, vec![DriveConfig::new("E:\\", "Movies")]);
        match fetcher.fetch().await.unwrap() {
            FetchOutcome::Readings(readings) => {
                assert_eq!(readings.len(), 1);
                assert_eq!(readings[0].label, "Movies");
            }
            FetchOutcome::NoData => panic!("expected readings"),
        }
    }
}
