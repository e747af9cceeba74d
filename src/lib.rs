//! Platoon Response - Reaction-time detection for vehicle platoons
//!
//! Given synchronized speed recordings of a leader and four followers, the
//! crate locates the instants where each vehicle starts a speed transition,
//! links the transitions that belong to the same leader event, and reports how
//! long each follower took to respond:
//! layout adaptation → cleaning → rolling statistics → change detection
//! → transition extraction → reaction matching → response times.
//!
//! ## Modules
//!
//! - **Detection core**: `statistics`, `change`, `transition`, `matcher`, `response`
//! - **Input/output**: `adapters` (CSV layouts), `cleaner`, `encoder` (JSON report),
//!   `export` (augmented CSV)

pub mod adapters;
pub mod change;
pub mod cleaner;
pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod matcher;
pub mod pipeline;
pub mod response;
pub mod rolling;
pub mod statistics;
pub mod transition;
pub mod types;

pub use config::{AnalysisConfig, CleaningConfig, DetectionConfig, TrailingDetection};
pub use error::AnalysisError;
pub use pipeline::{analyze, carma_csv_to_report_json, PlatoonAnalysis, PlatoonProcessor};
pub use types::{AnalysisReport, PlatoonSeries, ReactionTuple, ResponseTimes};

/// Number of vehicles in a platoon: the leader plus four followers
pub const PLATOON_SIZE: usize = 5;

/// Analyzer version embedded in every report
pub const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "platoon-response";
