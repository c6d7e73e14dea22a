//! Debug bundle writer for inspecting the loaded dataset and computed views.
//!
//! Bound to the `d` key in the TUI: dumps everything needed to reproduce a
//! screen (dataset stats, selector state, all four view tables, and the raw
//! report as JSON) into a timestamped markdown file.

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::domain::{ReportResult, RunConfig};
use crate::error::AppError;
use crate::io::ingest::IngestedData;

pub fn write_debug_bundle(
    ingest: &IngestedData,
    config: &RunConfig,
    report: &ReportResult,
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("autostats_debug_{ts}.md"));

    let mut out = String::new();
    out.push_str("# autostats debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- source: {:?}\n", config.source));
    out.push_str(&format!("- sample_seed: {}\n", config.sample_seed));
    out.push_str(&format!("- report: {}\n", config.mode.display_name()));
    if let Some(year) = report.year {
        out.push_str(&format!("- year: {year}\n"));
    }
    out.push_str(&format!(
        "- records: {} (of {} read, {} skipped)\n",
        ingest.stats.n_records,
        ingest.rows_read,
        ingest.row_errors.len(),
    ));
    out.push_str(&format!(
        "- years: {}..{} | recession rows: {}\n",
        ingest.stats.year_min, ingest.stats.year_max, ingest.stats.recession_rows,
    ));
    out.push_str(&format!(
        "- vehicle types: {}\n",
        ingest.stats.vehicle_types.join(", ")
    ));

    if !ingest.row_errors.is_empty() {
        out.push_str("\n## Skipped rows\n");
        for err in ingest.row_errors.iter().take(20) {
            out.push_str(&format!("- line {}: {}\n", err.line, err.message));
        }
        if ingest.row_errors.len() > 20 {
            out.push_str(&format!("- ... {} more\n", ingest.row_errors.len() - 20));
        }
    }

    for (idx, view) in report.views.iter().enumerate() {
        let tag = (b'A' + idx as u8) as char;
        out.push_str(&format!("\n## View {tag}: {} ({:?})\n", view.title, view.chart));
        out.push_str("| group | value |\n");
        out.push_str("| - | - |\n");
        for (key, value) in &view.rows {
            out.push_str(&format!("| {} | {value:.4} |\n", key.label()));
        }
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| AppError::new(4, format!("Failed to serialize report: {e}")))?;
    out.push_str("\n## Report JSON\n```json\n");
    out.push_str(&json);
    out.push_str("\n```\n");

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(out.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug bundle: {e}")))?;

    Ok(path)
}
