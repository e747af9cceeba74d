//! Pipeline orchestration
//!
//! This module provides the public API for platoon response analysis.
//! It orchestrates the full pipeline from a recording to reaction tuples and
//! response times. Every stage returns a new value; the input series is never
//! mutated.

use crate::adapters::{CarmaLayout, LayoutAdapter, StandardLayout};
use crate::change::ChangeDetector;
use crate::cleaner::SeriesCleaner;
use crate::config::{AnalysisConfig, DetectionConfig};
use crate::encoder::{self, ReportContext, ReportEncoder};
use crate::error::AnalysisError;
use crate::matcher::ConsecutiveMatcher;
use crate::statistics::StatisticsEngine;
use crate::transition::TransitionExtractor;
use crate::types::{AnalysisReport, PlatoonSeries, ReactionTuple, ResponseTimes, VehicleAnalysis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Complete output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatoonAnalysis {
    /// Parameters the run used
    pub config: DetectionConfig,
    /// The analyzed series
    pub series: PlatoonSeries,
    /// Per-vehicle statistics, flags and detection times, leader first
    pub vehicles: Vec<VehicleAnalysis>,
    /// Complete reaction tuples, one per matched leader transition
    pub reaction_tuples: Vec<ReactionTuple>,
    /// Leader transitions whose match did not reach the last vehicle
    pub discarded_tuples: usize,
    pub response_times: ResponseTimes,
}

impl PlatoonAnalysis {
    /// Detection times of every vehicle, leader first
    pub fn detection_times(&self) -> Vec<Vec<f64>> {
        self.vehicles
            .iter()
            .map(|v| v.detection_times.clone())
            .collect()
    }
}

/// Run the detection pipeline on an already cleaned series.
///
/// Pipeline stages:
/// 1. StatisticsEngine - Rolling speed statistics per vehicle
/// 2. ChangeDetector - Percentile excursions above the noise floor
/// 3. TransitionExtractor - Gated rising edges and onset times
/// 4. ConsecutiveMatcher - Reaction tuples across the platoon
/// 5. ResponseTimes - Consecutive and head-relative delays
pub fn analyze(
    series: PlatoonSeries,
    config: &DetectionConfig,
) -> Result<PlatoonAnalysis, AnalysisError> {
    config.validate()?;

    let statistics = StatisticsEngine::compute_platoon(&series, config.window_size);

    let vehicles: Vec<VehicleAnalysis> = statistics
        .into_iter()
        .enumerate()
        .map(|(vehicle_id, statistics)| {
            let change = ChangeDetector::detect(&statistics.abs_diff_std, config);
            let transitions =
                TransitionExtractor::extract(&change, &statistics.diff_speed, series.time(), config);

            debug!(
                vehicle_id,
                change_samples = change.iter().filter(|c| **c).count(),
                detections = transitions.times.len(),
                "Extracted transitions"
            );

            VehicleAnalysis {
                vehicle_id,
                statistics,
                change,
                change_ratio: transitions.change_ratio,
                detection: transitions.detection,
                detection_times: transitions.times,
            }
        })
        .collect();

    let detection_times: Vec<Vec<f64>> = vehicles
        .iter()
        .map(|v| v.detection_times.clone())
        .collect();
    let outcome = ConsecutiveMatcher::new(config.match_tolerance).reaction_tuples(&detection_times);
    let response_times = ResponseTimes::from_tuples(&outcome.tuples);

    info!(
        samples = series.len(),
        reaction_tuples = outcome.tuples.len(),
        discarded = outcome.discarded,
        "Platoon analysis complete"
    );

    Ok(PlatoonAnalysis {
        config: config.clone(),
        series,
        vehicles,
        reaction_tuples: outcome.tuples,
        discarded_tuples: outcome.discarded,
        response_times,
    })
}

/// Convert a CARMA recording to a JSON analysis report (default configuration).
///
/// # Arguments
/// * `csv_text` - Raw CARMA CSV export
/// * `experiment` - Name of the run, copied into the report provenance
///
/// # Example
/// ```ignore
/// let report_json = carma_csv_to_report_json(csv_text, "data6".to_string())?;
/// ```
pub fn carma_csv_to_report_json(
    csv_text: String,
    experiment: String,
) -> Result<String, AnalysisError> {
    PlatoonProcessor::new().process_csv_to_json(&CarmaLayout, &csv_text, &experiment)
}

/// Convert a standardized recording to a JSON analysis report (default configuration).
pub fn standard_csv_to_report_json(
    csv_text: String,
    experiment: String,
) -> Result<String, AnalysisError> {
    PlatoonProcessor::new().process_csv_to_json(&StandardLayout, &csv_text, &experiment)
}

/// Processor bundling a configuration with a report encoder.
///
/// Runs the full chain: parse -> clean -> analyze -> encode.
pub struct PlatoonProcessor {
    config: AnalysisConfig,
    encoder: ReportEncoder,
}

impl Default for PlatoonProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatoonProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with a validated configuration
    pub fn with_config(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Clean and analyze a series
    pub fn analyze_series(&self, series: &PlatoonSeries) -> Result<PlatoonAnalysis, AnalysisError> {
        let cleaned = SeriesCleaner::clean(series, &self.config.cleaning);
        analyze(cleaned, &self.config.detection)
    }

    /// Parse a recording with `layout` and return the cleaned analysis
    pub fn analyze_csv(
        &self,
        layout: &dyn LayoutAdapter,
        csv_text: &str,
    ) -> Result<PlatoonAnalysis, AnalysisError> {
        let series = layout.parse(csv_text)?;
        self.analyze_series(&series)
    }

    /// Parse, clean, analyze and encode a recording
    pub fn process_csv(
        &self,
        layout: &dyn LayoutAdapter,
        csv_text: &str,
        experiment: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let raw = layout.parse(csv_text)?;
        let (cleaned, cleaning) = SeriesCleaner::clean_with_summary(&raw, &self.config.cleaning);
        let analysis = analyze(cleaned, &self.config.detection)?;

        let context = ReportContext {
            experiment: experiment.to_string(),
            layout: layout.name().to_string(),
            cleaning: Some(cleaning),
        };
        Ok(self.encoder.encode(&analysis, &context))
    }

    /// Same as [`process_csv`](Self::process_csv), encoded as pretty JSON
    pub fn process_csv_to_json(
        &self,
        layout: &dyn LayoutAdapter,
        csv_text: &str,
        experiment: &str,
    ) -> Result<String, AnalysisError> {
        let report = self.process_csv(layout, csv_text, experiment)?;
        encoder::to_json(&report, true)
    }
}
