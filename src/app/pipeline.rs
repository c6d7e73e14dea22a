//! Shared "report pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset load -> report computation
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::{generate_sample, DatasetClient};
use crate::domain::{DataSource, ReportResult, RunConfig};
use crate::error::AppError;
use crate::io::ingest::{load_sales_csv, IngestedData};
use crate::report::compute_report;

/// All computed outputs of a single report run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub report: ReportResult,
}

/// Load the dataset from the configured source.
///
/// The dataset is loaded once and treated as read-only afterwards; reports
/// are recomputed against it on every interaction.
pub fn load_dataset(config: &RunConfig) -> Result<IngestedData, AppError> {
    match &config.source {
        DataSource::Csv(path) => load_sales_csv(path),
        DataSource::Remote => DatasetClient::from_env()?.fetch_dataset(),
        DataSource::Sample => IngestedData::from_records(generate_sample(config.sample_seed)?),
    }
}

/// Execute the full pipeline: load, then compute one report.
pub fn run_report(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_dataset(config)?;
    run_report_with_dataset(config, ingest)
}

/// Compute a report against an already-loaded dataset.
///
/// This is what the TUI uses so selector changes recompute without re-fetching.
pub fn run_report_with_dataset(
    config: &RunConfig,
    ingest: IngestedData,
) -> Result<RunOutput, AppError> {
    let report = compute_report(&ingest.records, config.mode, config.year)?;
    Ok(RunOutput { ingest, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportMode;

    #[test]
    fn sample_pipeline_produces_four_views() {
        let config = RunConfig {
            source: DataSource::Sample,
            sample_seed: 42,
            mode: ReportMode::RecessionPeriod,
            year: None,
            export: None,
        };
        let run = run_report(&config).unwrap();
        assert_eq!(run.report.views.len(), 4);
        assert!(run.report.views.iter().all(|v| !v.is_empty()));
    }

    #[test]
    fn yearly_pipeline_respects_selected_year() {
        let config = RunConfig {
            source: DataSource::Sample,
            sample_seed: 42,
            mode: ReportMode::Yearly,
            year: Some(1995),
            export: None,
        };
        let run = run_report(&config).unwrap();
        assert_eq!(run.report.year, Some(1995));
        // 1995 is not a recession year in the sample, but it has data.
        assert!(!run.report.views[1].is_empty());
    }
}
