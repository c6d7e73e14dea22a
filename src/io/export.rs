//! Export report views to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{GroupKey, ReportResult};
use crate::error::AppError;

/// Write all four views to a single CSV file.
///
/// One row per aggregated group: `view,chart,group,value` (plus the raw key
/// parts so the pair-keyed view stays machine-readable).
pub fn write_report_csv(path: &Path, report: &ReportResult) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "view,title,chart,group,unemployment_rate,vehicle_type,value")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (idx, view) in report.views.iter().enumerate() {
        let tag = (b'A' + idx as u8) as char;
        for (key, value) in &view.rows {
            let (rate, vehicle_type) = match key {
                GroupKey::RateVehicle { rate, vehicle_type } => {
                    (format!("{rate}"), vehicle_type.clone())
                }
                GroupKey::VehicleType(t) => (String::new(), t.clone()),
                _ => (String::new(), String::new()),
            };
            writeln!(
                file,
                "{tag},{},{:?},{},{rate},{vehicle_type},{value:.4}",
                escape(&view.title),
                view.chart,
                escape(&key.label()),
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

/// Quote a field if it contains CSV-significant characters.
fn escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_quotes_commas_and_quotes() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
