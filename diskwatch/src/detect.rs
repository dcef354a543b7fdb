//! Change detection between two reading sets
//!
//! Readings are paired by label: the k-th current reading labelled `L` is
//! compared with the k-th previous reading labelled `L`. A current reading
//! without a partner has no delta and never counts as a change.

use std::collections::HashMap;

use crate::types::{Snapshot, VolumeReading};

/// Minimum absolute free-space delta that warrants a notification, in
/// hundredths of a GB (1.00 GB)
pub const SIGNIFICANT_CHANGE_HUNDREDTHS: i64 = 100;

/// Why a change-check cycle should (or should not) notify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing has ever been announced for this timeline
    Initial,
    /// At least one volume moved by the threshold or more
    Significant,
    /// No volume moved enough
    Unchanged,
}

impl Decision {
    pub fn should_notify(self) -> bool {
        !matches!(self, Decision::Unchanged)
    }
}

/// Pair each current reading with its previous counterpart
pub fn pair_by_label<'a>(
    current: &'a [VolumeReading],
    previous: &'a [VolumeReading],
) -> Vec<(&'a VolumeReading, Option<&'a VolumeReading>)> {
    let mut by_label: HashMap<&str, Vec<&VolumeReading>> = HashMap::new();
    for reading in previous {
        by_label.entry(reading.label.as_str()).or_default().push(reading);
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    current
        .iter()
        .map(|reading| {
            let occurrence = seen.entry(reading.label.as_str()).or_insert(0);
            let partner = by_label
                .get(reading.label.as_str())
                .and_then(|matches| matches.get(*occurrence))
                .copied();
            *occurrence += 1;
            (reading, partner)
        })
        .collect()
}

/// Free-space delta (current minus previous) in hundredths of a GB
///
/// Negative when free space shrank.
pub fn delta_hundredths(current: &VolumeReading, previous: &VolumeReading) -> i64 {
    current.free_hundredths() - previous.free_hundredths()
}

/// Whether any volume's free space moved by at least 1 GB
pub fn has_significant_change(current: &[VolumeReading], previous: &[VolumeReading]) -> bool {
    pair_by_label(current, previous)
        .into_iter()
        .any(|(reading, partner)| match partner {
            Some(prev) => {
                let delta = delta_hundredths(reading, prev);
                tracing::debug!(
                    label = %reading.label,
                    delta_gb = delta as f64 / 100.0,
                    "Change in volume"
                );
                delta.abs() >= SIGNIFICANT_CHANGE_HUNDREDTHS
            }
            None => {
                tracing::debug!(label = %reading.label, "No previous reading for volume");
                false
            }
        })
}

/// Decide whether a change report is due for `current` given the
/// timeline's snapshot
pub fn decide(current: &[VolumeReading], snapshot: &Snapshot) -> Decision {
    if !snapshot.has_sent_initial {
        return Decision::Initial;
    }
    if has_significant_change(current, &snapshot.readings) {
        Decision::Significant
    } else {
        Decision::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(label: &str, free_gb: f64) -> VolumeReading {
        VolumeReading {
            label: label.to_string(),
            free_space_gb: free_gb,
            total_space_gb: 1000.0,
            remaining_percent: free_gb / 10.0,
        }
    }

    fn sent(readings: Vec<VolumeReading>) -> Snapshot {
        Snapshot {
            has_sent_initial: true,
            readings,
        }
    }

    #[test]
    fn test_identical_readings_are_not_significant() {
        let readings = vec![reading("TV", 100.0), reading("Movies", 250.5)];
        assert!(!has_significant_change(&readings, &readings));
        assert_eq!(decide(&readings, &sent(readings.clone())), Decision::Unchanged);
    }

    #[test]
    fn test_exactly_one_gb_is_significant() {
        let previous = vec![reading("TV", 100.0)];
        assert!(has_significant_change(&[reading("TV", 99.0)], &previous));
        assert!(has_significant_change(&[reading("TV", 101.0)], &previous));
    }

    #[test]
    fn test_just_under_one_gb_is_not_significant() {
        let previous = vec![reading("TV", 100.0)];
        assert!(!has_significant_change(&[reading("TV", 99.01)], &previous));
        assert!(!has_significant_change(&[reading("TV", 100.99)], &previous));
    }

    #[test]
    fn test_boundary_with_inexact_floats() {
        // 100.99 - 99.99 is not exactly 1.0 in binary floating point
        let previous = vec![reading("TV", 99.99)];
        assert!(has_significant_change(&[reading("TV", 100.99)], &previous));
    }

    #[test]
    fn test_any_volume_triggers() {
        let previous = vec![reading("TV", 100.0), reading("Movies", 50.0)];
        let current = vec![reading("TV", 100.0), reading("Movies", 45.0)];
        assert!(has_significant_change(&current, &previous));
    }

    #[test]
    fn test_missing_previous_is_not_significant() {
        let current = vec![reading("TV", 100.0), reading("New", 5.0)];
        let previous = vec![reading("TV", 100.0)];
        assert!(!has_significant_change(&current, &previous));
        assert!(!has_significant_change(&current, &[]));
    }

    #[test]
    fn test_reordered_volumes_pair_by_label() {
        let previous = vec![reading("TV", 100.0), reading("Movies", 500.0)];
        let current = vec![reading("Movies", 500.0), reading("TV", 100.0)];
        assert!(!has_significant_change(&current, &previous));
    }

    #[test]
    fn test_duplicate_labels_pair_in_order() {
        let previous = vec![reading("Media", 10.0), reading("Media", 20.0)];
        let current = vec![reading("Media", 10.0), reading("Media", 20.5)];
        let pairs = pair_by_label(&current, &previous);
        assert_eq!(pairs[0].1.map(|p| p.free_space_gb), Some(10.0));
        assert_eq!(pairs[1].1.map(|p| p.free_space_gb), Some(20.0));
        assert!(!has_significant_change(&current, &previous));
    }

    #[test]
    fn test_initial_flag_forces_notification() {
        let readings = vec![reading("TV", 100.0)];
        let snapshot = Snapshot {
            has_sent_initial: false,
            readings: readings.clone(),
        };
        assert_eq!(decide(&readings, &snapshot), Decision::Initial);
        assert!(Decision::Initial.should_notify());
    }

    #[test]
    fn test_significant_decision() {
        let snapshot = sent(vec![reading("TV", 100.0)]);
        let decision = decide(&[reading("TV", 98.5)], &snapshot);
        assert_eq!(decision, Decision::Significant);
        assert!(decision.should_notify());
        assert!(!Decision::Unchanged.should_notify());
    }

    #[test]
    fn test_delta_sign() {
        assert_eq!(delta_hundredths(&reading("TV", 98.5), &reading("TV", 100.0)), -150);
        assert_eq!(delta_hundredths(&reading("TV", 101.25), &reading("TV", 100.0)), 125);
    }
}
