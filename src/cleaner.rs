//! Recording cleanup
//!
//! This module prepares a raw platoon series for analysis:
//! - Rows without any speed sample are dropped
//! - Exact duplicate rows are dropped (first occurrence kept)
//! - Speeds are clipped into the configured range
//! - Rows are stably sorted by time
//!
//! This is the only stage that reorders rows.

use crate::config::CleaningConfig;
use crate::types::{PlatoonSeries, SeriesRow};
use crate::PLATOON_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// What the cleaner changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub input_rows: usize,
    pub empty_rows_dropped: usize,
    pub duplicate_rows_dropped: usize,
    pub clipped_samples: usize,
    /// Whether sorting changed the row order
    pub reordered: bool,
}

/// Cleaner for raw platoon series
pub struct SeriesCleaner;

impl SeriesCleaner {
    /// Clean a series, returning a new one
    pub fn clean(series: &PlatoonSeries, config: &CleaningConfig) -> PlatoonSeries {
        Self::clean_with_summary(series, config).0
    }

    /// Clean a series and report what changed
    pub fn clean_with_summary(
        series: &PlatoonSeries,
        config: &CleaningConfig,
    ) -> (PlatoonSeries, CleaningSummary) {
        let mut summary = CleaningSummary {
            input_rows: series.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let mut rows: Vec<SeriesRow> = Vec::with_capacity(series.len());
        for row in series.rows() {
            if row.speeds.iter().all(Option::is_none) {
                summary.empty_rows_dropped += 1;
                continue;
            }
            if !seen.insert(row_key(&row)) {
                summary.duplicate_rows_dropped += 1;
                continue;
            }
            rows.push(row);
        }

        for row in &mut rows {
            for speed in row.speeds.iter_mut().flatten() {
                let clipped = speed.max(config.min_speed).min(config.max_speed);
                if clipped != *speed {
                    summary.clipped_samples += 1;
                    *speed = clipped;
                }
            }
        }

        summary.reordered = !rows.windows(2).all(|w| w[0].time <= w[1].time);
        if summary.reordered {
            rows.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        debug!(
            input_rows = summary.input_rows,
            empty = summary.empty_rows_dropped,
            duplicates = summary.duplicate_rows_dropped,
            clipped = summary.clipped_samples,
            reordered = summary.reordered,
            "Cleaned platoon series"
        );

        (PlatoonSeries::from_rows(&rows), summary)
    }
}

/// Bit-exact identity of a row; `-0.0` and `0.0` compare equal
fn row_key(row: &SeriesRow) -> (u64, [Option<u64>; PLATOON_SIZE]) {
    fn bits(value: f64) -> u64 {
        if value == 0.0 {
            0
        } else {
            value.to_bits()
        }
    }
    (bits(row.time), row.speeds.map(|s| s.map(bits)))
}
