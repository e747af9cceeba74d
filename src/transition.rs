//! Transition extraction
//!
//! Turns the noisy change flags of one vehicle into isolated transition onsets:
//! 1. Share of change samples over the forward window
//! 2. Rising edges of `share > 0`
//! 3. Gate: drop edges that coincide with an abnormally large speed jump
//! 4. Collect the onset times, applying the trailing-detection policy

use crate::config::{DetectionConfig, TrailingDetection};
use crate::rolling::series_std;

/// Detection flags and onset times of a single vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDetections {
    /// Share of change samples in the forward window (0 where undefined)
    pub change_ratio: Vec<f64>,
    /// Gated rising edges
    pub detection: Vec<bool>,
    /// Onset times, ascending in source order
    pub times: Vec<f64>,
}

/// Transition extractor
pub struct TransitionExtractor;

impl TransitionExtractor {
    /// Extract transitions from change flags.
    ///
    /// `change`, `diff_speed` and `time` are aligned with the series rows.
    pub fn extract(
        change: &[bool],
        diff_speed: &[Option<f64>],
        time: &[f64],
        config: &DetectionConfig,
    ) -> TransitionDetections {
        let change_ratio = change_ratio(change, config.forward_window);
        let active: Vec<bool> = change_ratio.iter().map(|r| *r > 0.0).collect();
        let edges = rising_edges(&active);
        let gate = speed_jump_gate(diff_speed);

        let detection: Vec<bool> = edges
            .iter()
            .zip(&gate)
            .map(|(edge, pass)| *edge && *pass)
            .collect();

        let times = detection_times(&detection, time, config.trailing_detection);

        TransitionDetections {
            change_ratio,
            detection,
            times,
        }
    }
}

/// Share of `true` flags in each complete forward window; 0 where the window
/// runs past the end of the series
pub fn change_ratio(change: &[bool], window: usize) -> Vec<f64> {
    (0..change.len())
        .map(|k| match change.get(k..k + window) {
            Some(slice) if !slice.is_empty() => {
                slice.iter().filter(|c| **c).count() as f64 / slice.len() as f64
            }
            _ => 0.0,
        })
        .collect()
}

/// True only on the first sample of each run of `true`. The first sample of
/// the series has no predecessor and is never an edge.
pub fn rising_edges(flags: &[bool]) -> Vec<bool> {
    std::iter::once(false)
        .chain(flags.windows(2).map(|pair| !pair[0] && pair[1]))
        .take(flags.len())
        .collect()
}

/// `diff_speed[k] < std(diff_speed)`; missing samples fail the gate
pub fn speed_jump_gate(diff_speed: &[Option<f64>]) -> Vec<bool> {
    let threshold = series_std(diff_speed);
    diff_speed
        .iter()
        .map(|d| match (d, threshold) {
            (Some(d), Some(threshold)) => *d < threshold,
            _ => false,
        })
        .collect()
}

/// Times of the detected samples, with the trailing policy applied
pub fn detection_times(detection: &[bool], time: &[f64], policy: TrailingDetection) -> Vec<f64> {
    let mut times: Vec<f64> = detection
        .iter()
        .zip(time)
        .filter(|(detected, _)| **detected)
        .map(|(_, t)| *t)
        .collect();

    if policy == TrailingDetection::Drop {
        times.pop();
    }
    times
}
