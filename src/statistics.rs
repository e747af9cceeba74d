//! Speed statistics
//!
//! This module derives the smoothed statistics every later stage works from:
//! - Forward rolling mean of the speed
//! - Forward rolling standard deviation of that mean
//! - First difference of the std (signed and absolute)
//! - Absolute first difference of the mean

use crate::rolling::{first_difference, forward_apply, mean, sample_std};
use crate::types::{PlatoonSeries, SpeedStatistics};

/// Statistics engine for computing per-vehicle speed statistics
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Compute the statistics of a single speed column.
    ///
    /// The last `window_size - 1` samples of the mean, and correspondingly more
    /// of the std and its derivatives, are missing because no complete forward
    /// window exists for them.
    pub fn compute(speed: &[Option<f64>], window_size: usize) -> SpeedStatistics {
        let avg_speed = forward_apply(speed, window_size, mean);
        let std_speed = forward_apply(&avg_speed, window_size, sample_std);
        let diff_std = first_difference(&std_speed);
        let abs_diff_std = diff_std.iter().map(|d| d.map(f64::abs)).collect();
        let diff_speed = first_difference(&avg_speed)
            .into_iter()
            .map(|d| d.map(f64::abs))
            .collect();

        SpeedStatistics {
            avg_speed,
            std_speed,
            diff_std,
            abs_diff_std,
            diff_speed,
        }
    }

    /// Compute statistics for every vehicle of the platoon, leader first
    pub fn compute_platoon(series: &PlatoonSeries, window_size: usize) -> Vec<SpeedStatistics> {
        series
            .speeds()
            .iter()
            .map(|speed| Self::compute(speed, window_size))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PLATOON_SIZE;

    fn ramp(n: usize) -> Vec<Option<f64>> {
        (0..n).map(|k| Some(k as f64)).collect()
    }

    #[test]
    fn test_window_edge_is_missing_not_zero() {
        let n = 30;
        let w = 10;
        let stats = StatisticsEngine::compute(&ramp(n), w);

        assert!(stats.avg_speed[..n - (w - 1)].iter().all(Option::is_some));
        assert!(stats.avg_speed[n - (w - 1)..].iter().all(Option::is_none));

        // std needs w complete means
        let std_defined = n - 2 * (w - 1);
        assert!(stats.std_speed[..std_defined].iter().all(Option::is_some));
        assert!(stats.std_speed[std_defined..].iter().all(Option::is_none));

        assert_eq!(stats.diff_std[0], None);
        assert!(stats.diff_std[std_defined..].iter().all(Option::is_none));
        assert!(stats.abs_diff_std[std_defined..].iter().all(Option::is_none));
        assert_eq!(stats.diff_speed[0], None);
        assert!(stats.diff_speed[n - (w - 1)..].iter().all(Option::is_none));
    }

    #[test]
    fn test_forward_mean_of_ramp() {
        let stats = StatisticsEngine::compute(&ramp(12), 4);

        // mean of [k, k+4) on a unit ramp is k + 1.5
        assert_eq!(stats.avg_speed[0], Some(1.5));
        assert_eq!(stats.avg_speed[8], Some(9.5));
        assert_eq!(stats.avg_speed[9], None);

        // the mean advances by exactly one each sample
        assert_eq!(stats.diff_speed[1], Some(1.0));
        assert_eq!(stats.diff_speed[8], Some(1.0));
    }

    #[test]
    fn test_constant_speed_has_zero_variability() {
        let speed = vec![Some(20.0); 25];
        let stats = StatisticsEngine::compute(&speed, 5);

        let std_values: Vec<f64> = stats.std_speed.iter().flatten().copied().collect();
        assert!(!std_values.is_empty());
        assert!(std_values.iter().all(|s| *s == 0.0));
        assert!(stats.abs_diff_std.iter().flatten().all(|d| *d == 0.0));
    }

    #[test]
    fn test_short_series_is_all_missing() {
        let stats = StatisticsEngine::compute(&ramp(7), 10);

        assert!(stats.avg_speed.iter().all(Option::is_none));
        assert!(stats.std_speed.iter().all(Option::is_none));
        assert!(stats.abs_diff_std.iter().all(Option::is_none));
        assert!(stats.diff_speed.iter().all(Option::is_none));
        assert_eq!(stats.avg_speed.len(), 7);
    }

    #[test]
    fn test_diff_std_sign_and_abs() {
        let mut speed = vec![Some(10.0); 10];
        speed.extend((0..10).map(|k| Some(10.0 + 2.0 * k as f64)));
        speed.extend(vec![Some(28.0); 10]);
        let stats = StatisticsEngine::compute(&speed, 3);

        for (signed, abs) in stats.diff_std.iter().zip(&stats.abs_diff_std) {
            assert_eq!(signed.map(f64::abs), *abs);
        }
        assert!(stats.diff_std.iter().flatten().any(|d| *d > 0.0));
        assert!(stats.diff_std.iter().flatten().any(|d| *d < 0.0));
    }

    #[test]
    fn test_compute_platoon_covers_every_vehicle() {
        let series = PlatoonSeries::new(
            (0..15).map(|k| k as f64 * 0.1).collect(),
            std::array::from_fn(|v| ramp(15).into_iter().map(|s| s.map(|x| x + v as f64)).collect()),
        )
        .unwrap();

        let stats = StatisticsEngine::compute_platoon(&series, 5);
        assert_eq!(stats.len(), PLATOON_SIZE);
        assert_eq!(stats[0].avg_speed[0], Some(2.0));
        assert_eq!(stats[4].avg_speed[0], Some(6.0));
    }
}
