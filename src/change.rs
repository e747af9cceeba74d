//! Change detection
//!
//! A sample is flagged as changing when a high percentile of `abs_diff_std`
//! over the forward window rises above the noise floor of the whole recording
//! (the std of `abs_diff_std` over every present sample). The threshold is a
//! fixed rule, not a fitted model.

use crate::config::DetectionConfig;
use crate::rolling::{forward_apply, percentile, series_std};

/// Change detector over a vehicle's `abs_diff_std` column
pub struct ChangeDetector;

impl ChangeDetector {
    /// Flag changing samples. Missing percentiles or an undefined threshold
    /// resolve to `false`.
    pub fn detect(abs_diff_std: &[Option<f64>], config: &DetectionConfig) -> Vec<bool> {
        let threshold = series_std(abs_diff_std);
        let local = forward_apply(abs_diff_std, config.forward_window, |window| {
            percentile(window, config.percentile)
        });

        local
            .into_iter()
            .map(|value| match (value, threshold) {
                (Some(value), Some(threshold)) => value > threshold,
                _ => false,
            })
            .collect()
    }
}
