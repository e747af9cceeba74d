//! Report encoding
//!
//! This module encodes a finished analysis into a self-describing report:
//! producer and provenance metadata, the configuration that was used, the
//! detection times, reaction tuples and response-time tables, and a
//! per-follower summary.

use crate::cleaner::CleaningSummary;
use crate::error::AnalysisError;
use crate::pipeline::PlatoonAnalysis;
use crate::types::{
    AnalysisReport, DeltaSummary, FollowerSummary, ReportProducer, ReportProvenance,
    ResponseTimes,
};
use crate::{ANALYZER_VERSION, PLATOON_SIZE, PRODUCER_NAME};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Current report format version
pub const REPORT_VERSION: &str = "1.0.0";

/// Caller-supplied facts the analysis itself does not know
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportContext {
    /// Experiment or run name
    pub experiment: String,
    /// Name of the layout the recording was parsed with
    pub layout: String,
    pub cleaning: Option<CleaningSummary>,
}

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an analysis into a report
    pub fn encode(&self, analysis: &PlatoonAnalysis, context: &ReportContext) -> AnalysisReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ANALYZER_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let span = analysis.series.time_span();
        let provenance = ReportProvenance {
            experiment: context.experiment.clone(),
            layout: context.layout.clone(),
            samples: analysis.series.len(),
            time_start: span.map(|(start, _)| start),
            time_end: span.map(|(_, end)| end),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        AnalysisReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            config: analysis.config.clone(),
            cleaning: context.cleaning,
            detection_times: analysis.detection_times(),
            reaction_tuples: analysis.reaction_tuples.clone(),
            discarded_tuples: analysis.discarded_tuples,
            response_times: analysis.response_times.clone(),
            summary: summarize(&analysis.response_times),
        }
    }

    /// Encode to a compact JSON string
    pub fn encode_to_json(
        &self,
        analysis: &PlatoonAnalysis,
        context: &ReportContext,
    ) -> Result<String, AnalysisError> {
        to_json(&self.encode(analysis, context), false)
    }

    /// Encode to an indented JSON string
    pub fn encode_to_json_pretty(
        &self,
        analysis: &PlatoonAnalysis,
        context: &ReportContext,
    ) -> Result<String, AnalysisError> {
        to_json(&self.encode(analysis, context), true)
    }
}

/// Serialize an output value; failures are reported as encoding errors
pub(crate) fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, AnalysisError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| AnalysisError::EncodingError(e.to_string()))
}

/// One summary per follower slot, in slot order
pub fn summarize(response_times: &ResponseTimes) -> Vec<FollowerSummary> {
    (1..PLATOON_SIZE)
        .map(|follower| {
            let consecutive: Vec<f64> = response_times
                .leader_follower
                .iter()
                .filter_map(|row| row.follower(follower))
                .collect();
            let head: Vec<f64> = response_times
                .head_follower
                .iter()
                .filter_map(|row| row.follower(follower))
                .collect();

            FollowerSummary {
                follower,
                count: consecutive.len(),
                leader_follower: delta_summary(&consecutive),
                head_follower: delta_summary(&head),
            }
        })
        .collect()
}

fn delta_summary(values: &[f64]) -> DeltaSummary {
    if values.is_empty() {
        return DeltaSummary::default();
    }
    DeltaSummary {
        mean: Some(values.iter().sum::<f64>() / values.len() as f64),
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use crate::types::{PlatoonSeries, ReactionTuple};
    use pretty_assertions::assert_eq;

    fn make_test_analysis() -> PlatoonAnalysis {
        let time = vec![0.0, 0.5, 1.0, 1.5];
        let speeds = std::array::from_fn(|_| vec![Some(10.0); 4]);
        let reaction_tuples = vec![
            ReactionTuple([10.0, 11.0, 13.0, 14.0, 18.0]),
            ReactionTuple([40.0, 42.0, 43.0, 45.0, 46.0]),
        ];

        PlatoonAnalysis {
            config: DetectionConfig::default(),
            series: PlatoonSeries::new(time, speeds).unwrap(),
            vehicles: Vec::new(),
            response_times: ResponseTimes::from_tuples(&reaction_tuples),
            reaction_tuples,
            discarded_tuples: 3,
        }
    }

    fn context() -> ReportContext {
        ReportContext {
            experiment: "data6".to_string(),
            layout: "carma".to_string(),
            cleaning: None,
        }
    }

    #[test]
    fn test_encode_report() {
        let analysis = make_test_analysis();
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&analysis, &context());

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, ANALYZER_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");

        assert_eq!(report.provenance.experiment, "data6");
        assert_eq!(report.provenance.layout, "carma");
        assert_eq!(report.provenance.samples, 4);
        assert_eq!(report.provenance.time_start, Some(0.0));
        assert_eq!(report.provenance.time_end, Some(1.5));

        assert_eq!(report.reaction_tuples.len(), 2);
        assert_eq!(report.discarded_tuples, 3);
        assert_eq!(report.response_times.len(), 2);
    }

    #[test]
    fn test_summary_per_follower() {
        let report = ReportEncoder::new().encode(&make_test_analysis(), &context());

        assert_eq!(report.summary.len(), PLATOON_SIZE - 1);
        let first = &report.summary[0];
        assert_eq!(first.follower, 1);
        assert_eq!(first.count, 2);
        // deltas 1.0 and 2.0
        assert_eq!(first.leader_follower.mean, Some(1.5));
        assert_eq!(first.leader_follower.min, Some(1.0));
        assert_eq!(first.leader_follower.max, Some(2.0));

        let last = &report.summary[3];
        assert_eq!(last.follower, 4);
        // head deltas 8.0 and 6.0
        assert_eq!(last.head_follower.min, Some(6.0));
        assert_eq!(last.head_follower.max, Some(8.0));
        assert_eq!(last.head_follower.mean, Some(7.0));
    }

    #[test]
    fn test_summary_without_tuples_is_null() {
        let summary = summarize(&ResponseTimes::default());

        assert_eq!(summary.len(), PLATOON_SIZE - 1);
        for entry in &summary {
            assert_eq!(entry.count, 0);
            assert_eq!(entry.leader_follower, DeltaSummary::default());
        }

        let json = serde_json::to_value(&summary[0]).unwrap();
        assert!(json["leader_follower"]["mean"].is_null());
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(&make_test_analysis(), &context())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("report_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("provenance").is_some());
        assert!(parsed.get("config").is_some());
        assert!(parsed.get("summary").is_some());
        assert!(parsed.get("cleaning").is_none());
        assert_eq!(parsed["reaction_tuples"][0][4], 18.0);

        let pretty = encoder
            .encode_to_json_pretty(&make_test_analysis(), &context())
            .unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_unencodable_value_is_encoding_error() {
        // JSON object keys must be strings
        let mut value = std::collections::HashMap::new();
        value.insert((1u8, 2u8), 3u8);

        assert!(matches!(
            to_json(&value, true),
            Err(AnalysisError::EncodingError(_))
        ));
        assert_eq!(to_json(&vec![1u8, 2], false).unwrap(), "[1,2]");
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = ReportEncoder::with_instance_id("fixed".to_string())
            .encode(&make_test_analysis(), &context());
        let json = serde_json::to_string(&report).unwrap();

        assert_eq!(serde_json::from_str::<AnalysisReport>(&json).unwrap(), report);
    }
}
