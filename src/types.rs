//! Core types for the platoon response pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: the raw platoon series, per-vehicle statistics and flags, matched
//! reaction tuples and the derived response-time tables.

use crate::cleaner::CleaningSummary;
use crate::config::DetectionConfig;
use crate::error::AnalysisError;
use crate::PLATOON_SIZE;
use serde::{Deserialize, Serialize};

/// A numeric column where `None` marks a missing sample
pub type Column = Vec<Option<f64>>;

/// One row of a platoon recording
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// Sample time (seconds)
    pub time: f64,
    /// Speed per vehicle slot, leader first
    pub speeds: [Option<f64>; PLATOON_SIZE],
}

/// Normalized platoon recording: a `Time` column plus one speed column per
/// vehicle slot (slot 0 is the leader, slots 1-4 follow in physical order).
///
/// Time is expected to be non-decreasing but is not required to be uniformly
/// spaced. Only the cleaning stage reorders rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlatoonSeries")]
pub struct PlatoonSeries {
    time: Vec<f64>,
    speeds: [Column; PLATOON_SIZE],
}

/// Unchecked wire form of [`PlatoonSeries`]
#[derive(Deserialize)]
struct RawPlatoonSeries {
    time: Vec<f64>,
    speeds: [Column; PLATOON_SIZE],
}

impl TryFrom<RawPlatoonSeries> for PlatoonSeries {
    type Error = AnalysisError;

    fn try_from(raw: RawPlatoonSeries) -> Result<Self, Self::Error> {
        PlatoonSeries::new(raw.time, raw.speeds)
    }
}

impl PlatoonSeries {
    /// Build a series, checking that every speed column matches the time column
    pub fn new(time: Vec<f64>, speeds: [Column; PLATOON_SIZE]) -> Result<Self, AnalysisError> {
        for (vehicle_id, column) in speeds.iter().enumerate() {
            if column.len() != time.len() {
                return Err(AnalysisError::LengthMismatch {
                    column: format!("Speed - {vehicle_id}"),
                    expected: time.len(),
                    got: column.len(),
                });
            }
        }
        Ok(Self { time, speeds })
    }

    /// Build a series from rows, preserving their order
    pub fn from_rows(rows: &[SeriesRow]) -> Self {
        let time = rows.iter().map(|r| r.time).collect();
        let speeds = std::array::from_fn(|v| rows.iter().map(|r| r.speeds[v]).collect());
        Self { time, speeds }
    }

    /// Iterate the series row by row
    pub fn rows(&self) -> impl Iterator<Item = SeriesRow> + '_ {
        self.time.iter().enumerate().map(move |(k, &time)| SeriesRow {
            time,
            speeds: std::array::from_fn(|v| self.speeds[v][k]),
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Speed column of one vehicle slot
    ///
    /// # Panics
    /// Panics if `vehicle_id >= PLATOON_SIZE`.
    pub fn speed(&self, vehicle_id: usize) -> &[Option<f64>] {
        &self.speeds[vehicle_id]
    }

    pub fn speeds(&self) -> &[Column; PLATOON_SIZE] {
        &self.speeds
    }

    /// Whether the time column is non-decreasing
    pub fn is_time_ascending(&self) -> bool {
        self.time.windows(2).all(|w| w[0] <= w[1])
    }

    /// First and last time value, if any
    pub fn time_span(&self) -> Option<(f64, f64)> {
        Some((*self.time.first()?, *self.time.last()?))
    }

    /// Number of missing speed samples per vehicle slot
    pub fn missing_counts(&self) -> [usize; PLATOON_SIZE] {
        std::array::from_fn(|v| self.speeds[v].iter().filter(|s| s.is_none()).count())
    }
}

/// Derived speed statistics of one vehicle, aligned with the series rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedStatistics {
    /// Forward rolling mean of the speed
    pub avg_speed: Column,
    /// Forward rolling standard deviation of `avg_speed`
    pub std_speed: Column,
    /// First difference of `std_speed`
    pub diff_std: Column,
    /// Absolute value of `diff_std`
    pub abs_diff_std: Column,
    /// Absolute first difference of `avg_speed`
    pub diff_speed: Column,
}

/// Everything the pipeline derives for a single vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleAnalysis {
    /// Vehicle slot (0 = leader)
    pub vehicle_id: usize,
    pub statistics: SpeedStatistics,
    /// Samples where the local percentile of `abs_diff_std` exceeds its global std
    pub change: Vec<bool>,
    /// Share of change samples in the forward window (0 where undefined)
    pub change_ratio: Vec<f64>,
    /// Gated rising edges of the change ratio
    pub detection: Vec<bool>,
    /// Transition onset times, ascending
    pub detection_times: Vec<f64>,
}

/// One matched transition time per vehicle for a single leader event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionTuple(pub [f64; PLATOON_SIZE]);

impl ReactionTuple {
    pub fn instants(&self) -> &[f64; PLATOON_SIZE] {
        &self.0
    }

    /// Reaction time of the leader
    pub fn leader(&self) -> f64 {
        self.0[0]
    }
}

impl TryFrom<Vec<f64>> for ReactionTuple {
    type Error = Vec<f64>;

    /// Only complete matches (one instant per vehicle) convert
    fn try_from(instants: Vec<f64>) -> Result<Self, Self::Error> {
        <[f64; PLATOON_SIZE]>::try_from(instants).map(ReactionTuple)
    }
}

/// Response-time deltas of one reaction tuple, indexed by follower 1..=4
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseRow(pub [f64; PLATOON_SIZE - 1]);

impl ResponseRow {
    /// Delta for follower `index` (1-based, matching the vehicle slot)
    pub fn follower(&self, index: usize) -> Option<f64> {
        index.checked_sub(1).and_then(|i| self.0.get(i)).copied()
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Response-time tables derived from reaction tuples, one row per tuple
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimes {
    /// `t_i - t_{i-1}`: delay between consecutive vehicles
    pub leader_follower: Vec<ResponseRow>,
    /// `t_i - t_0`: delay since the leader reacted
    pub head_follower: Vec<ResponseRow>,
}

impl ResponseTimes {
    pub fn len(&self) -> usize {
        self.leader_follower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leader_follower.is_empty()
    }
}

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where the analyzed data came from and when the report was computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Experiment or run name supplied by the caller
    pub experiment: String,
    /// Layout adapter that parsed the recording
    pub layout: String,
    /// Rows analyzed after cleaning
    pub samples: usize,
    pub time_start: Option<f64>,
    pub time_end: Option<f64>,
    pub computed_at_utc: String,
}

/// Mean, minimum and maximum of one delta column (all `None` without tuples)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaSummary {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Response-time summary of one follower
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowerSummary {
    /// Follower slot (1..=4)
    pub follower: usize,
    /// Number of reaction tuples contributing
    pub count: usize,
    pub leader_follower: DeltaSummary,
    pub head_follower: DeltaSummary,
}

/// Complete analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub config: DetectionConfig,
    /// What the cleaning stage removed or changed, when it ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning: Option<CleaningSummary>,
    /// Detection times per vehicle, leader first
    pub detection_times: Vec<Vec<f64>>,
    pub reaction_tuples: Vec<ReactionTuple>,
    pub discarded_tuples: usize,
    pub response_times: ResponseTimes,
    pub summary: Vec<FollowerSummary>,
}
