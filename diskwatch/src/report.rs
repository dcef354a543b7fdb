//! Report formatting
//!
//! Renders one line per volume:
//!
//! ```text
//! TV: 98.50GB (49.25% Left, **1.50GB added**)
//! ```
//!
//! "added" means content was added to the volume (free space shrank),
//! "removed" means content was removed (free space grew).

use std::fmt;

use crate::detect::{delta_hundredths, pair_by_label};
use crate::types::VolumeReading;

/// Which report is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Sent by the change-check timeline
    Change,
    /// Sent by the daily timeline
    Daily,
}

impl ReportKind {
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Change => "Change Report",
            ReportKind::Daily => "Daily Report",
        }
    }

    fn no_change_text(self) -> &'static str {
        match self {
            ReportKind::Change => "No change",
            ReportKind::Daily => "No change in the last 24 hours",
        }
    }

    fn period_suffix(self) -> &'static str {
        match self {
            ReportKind::Change => "",
            ReportKind::Daily => " in the last 24 hours",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A free-space delta in hundredths of a GB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta(pub i64);

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let direction = if self.0 < 0 { "added" } else { "removed" };
        write!(f, "{}.{:02}GB {}", magnitude / 100, magnitude % 100, direction)
    }
}

/// Format the report sent when a change check decides to notify
pub fn format_change_report(current: &[VolumeReading], previous: &[VolumeReading]) -> String {
    format_report(ReportKind::Change, current, previous)
}

/// Format the once-a-day report
pub fn format_daily_report(current: &[VolumeReading], previous: &[VolumeReading]) -> String {
    format_report(ReportKind::Daily, current, previous)
}

/// Format a report with its bold title line
pub fn format_report(kind: ReportKind, current: &[VolumeReading], previous: &[VolumeReading]) -> String {
    let lines: Vec<String> = pair_by_label(current, previous)
        .into_iter()
        .map(|(reading, partner)| format_line(kind, reading, partner))
        .collect();

    format!("**{}:**\n{}", kind.title(), lines.join("\n"))
}

fn format_line(kind: ReportKind, reading: &VolumeReading, previous: Option<&VolumeReading>) -> String {
    let delta = previous
        .map(|prev| delta_hundredths(reading, prev))
        .unwrap_or(0);

    let annotation = if delta == 0 {
        kind.no_change_text().to_string()
    } else {
        format!("**{}{}**", Delta(delta), kind.period_suffix())
    };

    format!(
        "{}: {:.2}GB ({:.2}% Left, {})",
        reading.label, reading.free_space_gb, reading.remaining_percent, annotation
    )
}
