//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while computing reports
//! - exported to CSV/JSON
//! - rendered later by the CLI tables or the TUI charts

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// First year offered by the year selector.
pub const YEAR_MIN: u16 = 1980;
/// Last year offered by the year selector.
pub const YEAR_MAX: u16 = 2023;

/// Calendar month, in calendar order.
///
/// The dataset stores months as names ("Jan" .. "Dec"); parsing is
/// case-insensitive and also accepts full names ("January").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Short label as it appears in the dataset.
    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    fn full_name(self) -> &'static str {
        match self {
            Month::Jan => "january",
            Month::Feb => "february",
            Month::Mar => "march",
            Month::Apr => "april",
            Month::May => "may",
            Month::Jun => "june",
            Month::Jul => "july",
            Month::Aug => "august",
            Month::Sep => "september",
            Month::Oct => "october",
            Month::Nov => "november",
            Month::Dec => "december",
        }
    }

    /// Parse a month name from the dataset (short or full, any case).
    pub fn parse(s: &str) -> Option<Month> {
        let lower = s.trim().to_ascii_lowercase();
        Month::ALL
            .into_iter()
            .find(|m| lower == m.label().to_ascii_lowercase() || lower == m.full_name())
    }
}

/// Which of the two report pipelines to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportMode {
    /// Single-year statistics (year selector applies).
    Yearly,
    /// Recession-period statistics (year selector not applicable).
    RecessionPeriod,
}

impl ReportMode {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ReportMode::Yearly => "Yearly Statistics",
            ReportMode::RecessionPeriod => "Recession Period Statistics",
        }
    }

    pub fn toggle(self) -> ReportMode {
        match self {
            ReportMode::Yearly => ReportMode::RecessionPeriod,
            ReportMode::RecessionPeriod => ReportMode::Yearly,
        }
    }
}

/// One row of the automobile sales dataset.
///
/// Records are immutable once ingested; the report engine only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecord {
    pub year: u16,
    pub month: Month,
    pub recession: bool,
    pub vehicle_type: String,
    pub automobile_sales: f64,
    pub advertising_expenditure: f64,
    pub unemployment_rate: f64,
}

/// The in-memory dataset: loaded once at startup, read-only afterwards.
///
/// Insertion order is irrelevant to results because every view is a grouping
/// aggregation.
pub type SalesDataset = Vec<SalesRecord>;

/// How a view is meant to be drawn.
///
/// Rendering is a consumer concern; the engine only tags each view with the
/// chart kind the dashboard uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Trend over an ordered axis (years, months).
    Line,
    /// Categorical bars.
    Bar,
    /// Proportions of a total (percentage bars in the terminal).
    Share,
    /// Bars clustered by a secondary category.
    GroupedBar,
}

/// Group key of one aggregated row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupKey {
    Year(u16),
    Month(Month),
    VehicleType(String),
    /// Pair key for the unemployment-rate view.
    RateVehicle { rate: f64, vehicle_type: String },
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            GroupKey::Year(y) => y.to_string(),
            GroupKey::Month(m) => m.label().to_string(),
            GroupKey::VehicleType(t) => t.clone(),
            GroupKey::RateVehicle { rate, vehicle_type } => {
                format!("{rate:.1}% / {vehicle_type}")
            }
        }
    }
}

/// One derived table of (group key, metric) rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateView {
    pub title: String,
    pub chart: ChartKind,
    pub rows: Vec<(GroupKey, f64)>,
}

impl AggregateView {
    /// Empty filtered subsets produce empty views, never errors.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The four views of one report, in fixed A..D order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResult {
    pub mode: ReportMode,
    /// The selected year (`None` in recession-period mode).
    pub year: Option<u16>,
    pub views: [AggregateView; 4],
}

/// Where the dataset comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Local CSV file.
    Csv(PathBuf),
    /// Download from the public dataset URL (or `AUTO_SALES_CSV_URL`).
    Remote,
    /// Deterministic synthetic dataset.
    Sample,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DataSource,
    pub sample_seed: u64,

    pub mode: ReportMode,
    pub year: Option<u16>,

    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parse_accepts_short_and_full_names() {
        assert_eq!(Month::parse("Jan"), Some(Month::Jan));
        assert_eq!(Month::parse("january"), Some(Month::Jan));
        assert_eq!(Month::parse(" SEP "), Some(Month::Sep));
        assert_eq!(Month::parse("September"), Some(Month::Sep));
        assert_eq!(Month::parse("Janu"), None);
    }

    #[test]
    fn month_order_is_calendar_order() {
        assert!(Month::Jan < Month::Feb);
        let mut months = vec![Month::Dec, Month::Jan, Month::Jul];
        months.sort();
        assert_eq!(months, vec![Month::Jan, Month::Jul, Month::Dec]);
    }

    #[test]
    fn mode_toggle_round_trips() {
        assert_eq!(ReportMode::Yearly.toggle(), ReportMode::RecessionPeriod);
        assert_eq!(ReportMode::RecessionPeriod.toggle(), ReportMode::Yearly);
    }
}
