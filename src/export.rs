//! Column export
//!
//! Writes the analyzed series together with every derived column as one CSV
//! table, for plotting tools that work on the augmented recording.

use crate::pipeline::PlatoonAnalysis;
use crate::types::{Column, VehicleAnalysis};
use crate::PLATOON_SIZE;

/// Header of the exported table
pub fn column_names() -> Vec<String> {
    let mut names = vec!["Time".to_string()];
    names.extend((0..PLATOON_SIZE).map(|v| format!("Speed - {v}")));
    for v in 0..PLATOON_SIZE {
        names.extend(
            [
                "Avg_Speed",
                "Std_Speed",
                "Diff_Std_Speed",
                "Abs_Diff_Std_Speed",
                "Diff_Speed",
                "Change",
                "Detection",
            ]
            .iter()
            .map(|suffix| format!("{v}_{suffix}")),
        );
    }
    names
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn cell(column: &Column, k: usize) -> String {
    number(column.get(k).copied().flatten())
}

fn flag(flags: &[bool], k: usize) -> &'static str {
    if flags.get(k).copied().unwrap_or(false) {
        "true"
    } else {
        "false"
    }
}

fn vehicle_cells(vehicle: &VehicleAnalysis, k: usize) -> [String; 7] {
    let stats = &vehicle.statistics;
    [
        cell(&stats.avg_speed, k),
        cell(&stats.std_speed, k),
        cell(&stats.diff_std, k),
        cell(&stats.abs_diff_std, k),
        cell(&stats.diff_speed, k),
        flag(&vehicle.change, k).to_string(),
        flag(&vehicle.detection, k).to_string(),
    ]
}

/// Render the augmented column table. Missing values are empty cells.
pub fn columns_to_csv(analysis: &PlatoonAnalysis) -> String {
    let series = &analysis.series;
    let mut out = column_names().join(",");
    out.push('\n');

    for (k, row) in series.rows().enumerate() {
        let mut fields = vec![row.time.to_string()];
        fields.extend(row.speeds.iter().map(|s| number(*s)));
        for vehicle in &analysis.vehicles {
            fields.extend(vehicle_cells(vehicle, k));
        }
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}
