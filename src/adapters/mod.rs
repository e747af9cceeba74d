//! Recording layout adapters
//!
//! This module provides adapters that read delimited platoon recordings and map
//! their dataset-specific column names onto the standard `Time` + `Speed - 0..4`
//! layout used by the rest of the pipeline.

mod carma;
mod standard;

pub use carma::CarmaLayout;
pub use standard::StandardLayout;

use crate::error::AnalysisError;
use crate::types::{Column, PlatoonSeries};
use crate::PLATOON_SIZE;
use tracing::{debug, warn};

/// Standard name of the time column
pub const TIME_COLUMN: &str = "Time";

/// Trait for recording layout adapters
pub trait LayoutAdapter {
    /// Short identifier of the layout (used on the command line and in reports)
    fn name(&self) -> &'static str;

    /// Name of the time column in the source file
    fn time_column(&self) -> &str {
        TIME_COLUMN
    }

    /// Source column holding each vehicle's speed, leader first
    fn speed_columns(&self) -> [String; PLATOON_SIZE];

    /// Whether a header row carries every column this layout needs
    fn matches_header(&self, header: &[String]) -> bool {
        let has = |name: &str| header.iter().any(|h| h == name);
        has(self.time_column()) && self.speed_columns().iter().all(|c| has(c))
    }

    /// Parse delimited text into a standardized platoon series
    fn parse(&self, text: &str) -> Result<PlatoonSeries, AnalysisError> {
        parse_delimited(text, self.time_column(), &self.speed_columns())
    }
}

/// Every built-in layout, most specific first
pub fn builtin_layouts() -> Vec<Box<dyn LayoutAdapter>> {
    vec![Box::new(CarmaLayout), Box::new(StandardLayout)]
}

/// Select a layout by its name
pub fn layout_by_name(name: &str) -> Result<Box<dyn LayoutAdapter>, AnalysisError> {
    builtin_layouts()
        .into_iter()
        .find(|layout| layout.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| AnalysisError::UnsupportedLayout(name.to_string()))
}

/// Select the first layout whose columns all appear in the header of `text`
pub fn detect_layout(text: &str) -> Result<Box<dyn LayoutAdapter>, AnalysisError> {
    let header = header_line(text)
        .map(split_fields)
        .ok_or_else(|| AnalysisError::ParseError("input has no header row".to_string()))?;

    builtin_layouts()
        .into_iter()
        .find(|layout| layout.matches_header(&header))
        .ok_or_else(|| {
            AnalysisError::UnsupportedLayout(format!(
                "no known layout matches columns [{}]",
                header.join(", ")
            ))
        })
}

fn header_line(text: &str) -> Option<&str> {
    text.lines().find(|line| !line.trim().is_empty())
}

/// Split one comma separated line, trimming whitespace and surrounding quotes
pub fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().trim_matches('"').trim().to_string())
        .collect()
}

/// Parse a numeric cell; empty, `nan` and non-finite cells are missing
fn parse_cell(cell: Option<&String>) -> Option<f64> {
    let cell = cell?;
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn column_index(header: &[String], name: &str) -> Result<usize, AnalysisError> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
}

/// Read the time column and the given speed columns from delimited text.
///
/// Rows without a usable time value are skipped; unreadable speed cells become
/// missing samples. Row order is preserved.
pub fn parse_delimited(
    text: &str,
    time_column: &str,
    speed_columns: &[String; PLATOON_SIZE],
) -> Result<PlatoonSeries, AnalysisError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .map(split_fields)
        .ok_or_else(|| AnalysisError::ParseError("input has no header row".to_string()))?;

    let time_index = column_index(&header, time_column)?;
    let mut speed_indices = [0usize; PLATOON_SIZE];
    for (slot, name) in speed_indices.iter_mut().zip(speed_columns) {
        *slot = column_index(&header, name)?;
    }

    let mut time = Vec::new();
    let mut speeds: [Column; PLATOON_SIZE] = Default::default();
    let mut skipped = 0usize;

    for (line_number, line) in lines.enumerate() {
        let fields = split_fields(line);

        let Some(t) = parse_cell(fields.get(time_index)) else {
            warn!(row = line_number + 1, "Skipping row without a valid time value");
            skipped += 1;
            continue;
        };

        time.push(t);
        for (column, &index) in speeds.iter_mut().zip(&speed_indices) {
            column.push(parse_cell(fields.get(index)));
        }
    }

    debug!(rows = time.len(), skipped, "Parsed platoon recording");
    PlatoonSeries::new(time, speeds)
}
