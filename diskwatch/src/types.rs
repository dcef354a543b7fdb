//! Core data model: drive definitions, volume readings and snapshots

use serde::{Deserialize, Serialize};

/// Bytes per gigabyte (binary, 2^30)
pub const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Maps a filesystem path prefix to the name shown in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Path prefix matched against the paths the API reports
    pub path: String,
    /// Display alias used as the reading label
    pub alias: String,
}

impl DriveConfig {
    pub fn new(path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: alias.into(),
        }
    }

    /// Whether a reported volume path falls under this drive
    pub fn matches(&self, volume_path: &str) -> bool {
        volume_path.starts_with(&self.path)
    }
}

/// One monitored volume's derived state at a point in time
///
/// All three figures are held rounded to two decimal places and are
/// persisted as two-decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeReading {
    pub label: String,
    #[serde(rename = "freeSpaceGB", with = "two_places")]
    pub free_space_gb: f64,
    #[serde(rename = "totalSpaceGB", with = "two_places")]
    pub total_space_gb: f64,
    #[serde(rename = "remainingPercent", with = "two_places")]
    pub remaining_percent: f64,
}

impl VolumeReading {
    /// Derive a reading from raw byte counts
    ///
    /// A zero total yields a remaining percentage of 0.
    pub fn from_bytes(label: impl Into<String>, free_bytes: i64, total_bytes: i64) -> Self {
        let free_space_gb = round2(free_bytes as f64 / BYTES_PER_GB);
        let total_space_gb = round2(total_bytes as f64 / BYTES_PER_GB);
        let remaining_percent = if total_bytes == 0 {
            0.0
        } else {
            round2(free_bytes as f64 / total_bytes as f64 * 100.0)
        };

        Self {
            label: label.into(),
            free_space_gb,
            total_space_gb,
            remaining_percent,
        }
    }

    /// Free space in hundredths of a GB
    pub fn free_hundredths(&self) -> i64 {
        hundredths(self.free_space_gb)
    }
}

/// Persisted state for one timeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Whether this timeline has ever delivered a notification
    pub has_sent_initial: bool,
    /// Most recent fetch result, in API order
    pub readings: Vec<VolumeReading>,
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a two-decimal value to integer hundredths
pub fn hundredths(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Serde adapter: write `f64` as a two-decimal string, accept a string or
/// a number on the way in
mod two_places {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::round2;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.2}", value))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| de::Error::custom(format!("invalid number {:?}: {}", s, e)))?,
        };
        if !value.is_finite() {
            return Err(de::Error::custom("number must be finite"));
        }
        Ok(round2(value))
    }
}
