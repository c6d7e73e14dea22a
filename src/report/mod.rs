//! The report engine: grouping aggregations over the sales dataset.
//!
//! Responsibilities:
//!
//! - compute the four aggregate views for the active report mode
//! - keep view order fixed (A..D) so consumers can pair them two-per-row
//! - expose the year-selector availability rule used by the UI
//!
//! The engine never mutates the dataset and never fails on empty filtered
//! subsets; aggregation over zero rows simply yields a view with zero groups.

use std::collections::BTreeMap;

use crate::domain::{
    AggregateView, ChartKind, GroupKey, Month, ReportMode, ReportResult, SalesRecord,
};
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Whether the year selector applies to the given mode.
///
/// The UI disables the selector when this returns `false`; that UI-level
/// invariant is what keeps [`compute_report`] from ever seeing
/// `Yearly` without a year.
pub fn year_selector_enabled(mode: ReportMode) -> bool {
    match mode {
        ReportMode::Yearly => true,
        ReportMode::RecessionPeriod => false,
    }
}

/// Compute the four views for one selector state.
///
/// `year` is required in yearly mode and ignored in recession-period mode.
/// A missing year in yearly mode is a caller-contract violation, not a
/// recoverable state.
pub fn compute_report(
    dataset: &[SalesRecord],
    mode: ReportMode,
    year: Option<u16>,
) -> Result<ReportResult, AppError> {
    match mode {
        ReportMode::RecessionPeriod => Ok(recession_report(dataset)),
        ReportMode::Yearly => {
            let year = year.ok_or_else(|| {
                AppError::new(2, "Yearly statistics require a selected year.")
            })?;
            Ok(yearly_report(dataset, year))
        }
    }
}

fn recession_report(dataset: &[SalesRecord]) -> ReportResult {
    let recession: Vec<&SalesRecord> = dataset.iter().filter(|r| r.recession).collect();

    let sales_by_year = mean_by(&recession, |r| GroupKey::Year(r.year), |r| r.automobile_sales);
    let sales_by_type = mean_by(
        &recession,
        |r| GroupKey::VehicleType(r.vehicle_type.clone()),
        |r| r.automobile_sales,
    );
    let adspend_by_type = sum_by(
        &recession,
        |r| GroupKey::VehicleType(r.vehicle_type.clone()),
        |r| r.advertising_expenditure,
    );
    let sales_by_rate_type = mean_by(
        &recession,
        |r| GroupKey::RateVehicle {
            rate: r.unemployment_rate,
            vehicle_type: r.vehicle_type.clone(),
        },
        |r| r.automobile_sales,
    );

    ReportResult {
        mode: ReportMode::RecessionPeriod,
        year: None,
        views: [
            AggregateView {
                title: "Average Automobile Sales fluctuation over Recession Period".to_string(),
                chart: ChartKind::Line,
                rows: sales_by_year,
            },
            AggregateView {
                title: "Average Automobile Sales by Vehicle Type during Recession".to_string(),
                chart: ChartKind::Bar,
                rows: sales_by_type,
            },
            AggregateView {
                title: "Total Advertising Expenditure Share by Vehicle Type during Recession"
                    .to_string(),
                chart: ChartKind::Share,
                rows: adspend_by_type,
            },
            AggregateView {
                title: "Effect of Unemployment Rate on Vehicle Type and Sales".to_string(),
                chart: ChartKind::GroupedBar,
                rows: sales_by_rate_type,
            },
        ],
    }
}

fn yearly_report(dataset: &[SalesRecord], year: u16) -> ReportResult {
    // View A deliberately spans the whole history, independent of the
    // selected year. This mirrors the observed dashboard behavior and is
    // pinned by a test.
    let all: Vec<&SalesRecord> = dataset.iter().collect();
    let sales_by_year = mean_by(&all, |r| GroupKey::Year(r.year), |r| r.automobile_sales);

    let selected: Vec<&SalesRecord> = dataset.iter().filter(|r| r.year == year).collect();

    let sales_by_month = sum_by(&selected, |r| GroupKey::Month(r.month), |r| r.automobile_sales);
    let sales_by_type = mean_by(
        &selected,
        |r| GroupKey::VehicleType(r.vehicle_type.clone()),
        |r| r.automobile_sales,
    );
    let adspend_by_type = sum_by(
        &selected,
        |r| GroupKey::VehicleType(r.vehicle_type.clone()),
        |r| r.advertising_expenditure,
    );

    ReportResult {
        mode: ReportMode::Yearly,
        year: Some(year),
        views: [
            AggregateView {
                title: "Average Automobile Sales by Year".to_string(),
                chart: ChartKind::Line,
                rows: sales_by_year,
            },
            AggregateView {
                title: "Total Monthly Automobile Sales".to_string(),
                chart: ChartKind::Line,
                rows: sales_by_month,
            },
            AggregateView {
                title: format!("Average Vehicles Sold by Vehicle Type in the year {year}"),
                chart: ChartKind::Bar,
                rows: sales_by_type,
            },
            AggregateView {
                title: format!("Total Advertisement Expenditure by Vehicle Type in the year {year}"),
                chart: ChartKind::Share,
                rows: adspend_by_type,
            },
        ],
    }
}

/// f64 key with a total order, so unemployment rates can live in a `BTreeMap`.
///
/// Ingest rejects non-finite rates, so `total_cmp` ordering here matches
/// ordinary numeric ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RateKey(f64);

impl Eq for RateKey {}

impl PartialOrd for RateKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RateKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Sort key giving every `GroupKey` variant a deterministic order:
/// years and months ascending, vehicle types alphabetical, rate pairs by
/// rate then type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum OrderedKey {
    Year(u16),
    Month(Month),
    VehicleType(String),
    RateVehicle(RateKey, String),
}

fn ordered(key: &GroupKey) -> OrderedKey {
    match key {
        GroupKey::Year(y) => OrderedKey::Year(*y),
        GroupKey::Month(m) => OrderedKey::Month(*m),
        GroupKey::VehicleType(t) => OrderedKey::VehicleType(t.clone()),
        GroupKey::RateVehicle { rate, vehicle_type } => {
            OrderedKey::RateVehicle(RateKey(*rate), vehicle_type.clone())
        }
    }
}

fn mean_by(
    rows: &[&SalesRecord],
    key_fn: impl Fn(&SalesRecord) -> GroupKey,
    value_fn: impl Fn(&SalesRecord) -> f64,
) -> Vec<(GroupKey, f64)> {
    let mut groups: BTreeMap<OrderedKey, (GroupKey, f64, usize)> = BTreeMap::new();
    for r in rows {
        let key = key_fn(r);
        let entry = groups.entry(ordered(&key)).or_insert((key, 0.0, 0));
        entry.1 += value_fn(r);
        entry.2 += 1;
    }
    groups
        .into_values()
        .map(|(key, sum, n)| (key, sum / n as f64))
        .collect()
}

fn sum_by(
    rows: &[&SalesRecord],
    key_fn: impl Fn(&SalesRecord) -> GroupKey,
    value_fn: impl Fn(&SalesRecord) -> f64,
) -> Vec<(GroupKey, f64)> {
    let mut groups: BTreeMap<OrderedKey, (GroupKey, f64)> = BTreeMap::new();
    for r in rows {
        let key = key_fn(r);
        let entry = groups.entry(ordered(&key)).or_insert((key, 0.0));
        entry.1 += value_fn(r);
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        year: u16,
        month: Month,
        recession: bool,
        vehicle_type: &str,
        sales: f64,
        adspend: f64,
        rate: f64,
    ) -> SalesRecord {
        SalesRecord {
            year,
            month,
            recession,
            vehicle_type: vehicle_type.to_string(),
            automobile_sales: sales,
            advertising_expenditure: adspend,
            unemployment_rate: rate,
        }
    }

    fn fixture() -> Vec<SalesRecord> {
        vec![
            record(1980, Month::Jan, true, "Car", 100.0, 10.0, 5.0),
            record(1980, Month::Feb, true, "Truck", 60.0, 8.0, 5.5),
            record(1980, Month::Mar, false, "Car", 200.0, 20.0, 4.0),
            record(1981, Month::Jan, false, "Car", 220.0, 22.0, 3.5),
            record(1981, Month::Jan, true, "Car", 80.0, 6.0, 6.0),
            record(1982, Month::Dec, false, "Truck", 90.0, 9.0, 4.5),
        ]
    }

    #[test]
    fn yearly_monthly_sums_add_up_to_year_total() {
        let data = fixture();
        for year in [1980u16, 1981, 1982] {
            let report = compute_report(&data, ReportMode::Yearly, Some(year)).unwrap();
            let monthly_total: f64 = report.views[1].rows.iter().map(|(_, v)| v).sum();
            let raw_total: f64 = data
                .iter()
                .filter(|r| r.year == year)
                .map(|r| r.automobile_sales)
                .sum();
            assert!((monthly_total - raw_total).abs() < 1e-9, "year {year}");
        }
    }

    #[test]
    fn yearly_view_a_is_independent_of_selected_year() {
        let data = fixture();
        let a_1980 = compute_report(&data, ReportMode::Yearly, Some(1980))
            .unwrap()
            .views[0]
            .rows
            .clone();
        let a_1982 = compute_report(&data, ReportMode::Yearly, Some(1982))
            .unwrap()
            .views[0]
            .rows
            .clone();
        let a_2023 = compute_report(&data, ReportMode::Yearly, Some(2023))
            .unwrap()
            .views[0]
            .rows
            .clone();
        assert_eq!(a_1980, a_1982);
        assert_eq!(a_1980, a_2023);
        // Whole-history means: 1980 = (100+60+200)/3, 1981 = (220+80)/2.
        assert_eq!(a_1980[0], (GroupKey::Year(1980), 120.0));
        assert_eq!(a_1980[1], (GroupKey::Year(1981), 150.0));
        assert_eq!(a_1980[2], (GroupKey::Year(1982), 90.0));
    }

    #[test]
    fn group_keys_are_unique_and_drawn_from_the_input() {
        let data = fixture();
        for (mode, year) in [
            (ReportMode::Yearly, Some(1980)),
            (ReportMode::RecessionPeriod, None),
        ] {
            let report = compute_report(&data, mode, year).unwrap();
            for view in &report.views {
                for (i, (key, _)) in view.rows.iter().enumerate() {
                    assert!(
                        !view.rows[i + 1..].iter().any(|(other, _)| other == key),
                        "duplicate key {key:?} in '{}'",
                        view.title
                    );
                    match key {
                        GroupKey::Year(y) => assert!(data.iter().any(|r| r.year == *y)),
                        GroupKey::Month(m) => assert!(data.iter().any(|r| r.month == *m)),
                        GroupKey::VehicleType(t) => {
                            assert!(data.iter().any(|r| &r.vehicle_type == t))
                        }
                        GroupKey::RateVehicle { rate, vehicle_type } => assert!(data
                            .iter()
                            .any(|r| r.unemployment_rate == *rate
                                && &r.vehicle_type == vehicle_type)),
                    }
                }
            }
        }
    }

    #[test]
    fn recession_views_ignore_non_recession_rows() {
        let mut data = fixture();
        let base = compute_report(&data, ReportMode::RecessionPeriod, None).unwrap();

        // Adding a non-recession outlier must not move any recession view.
        data.push(record(1980, Month::Jul, false, "Car", 1e9, 1e9, 5.0));
        let with_outlier = compute_report(&data, ReportMode::RecessionPeriod, None).unwrap();

        for (before, after) in base.views.iter().zip(with_outlier.views.iter()) {
            assert_eq!(before.rows, after.rows, "view '{}' moved", before.title);
        }
    }

    #[test]
    fn recession_view_a_orders_years_ascending() {
        let data = fixture();
        let report = compute_report(&data, ReportMode::RecessionPeriod, None).unwrap();
        let years: Vec<u16> = report.views[0]
            .rows
            .iter()
            .map(|(k, _)| match k {
                GroupKey::Year(y) => *y,
                other => panic!("unexpected key {other:?}"),
            })
            .collect();
        assert_eq!(years, vec![1980, 1981]);
    }

    #[test]
    fn unemployment_view_groups_by_rate_then_type() {
        let data = fixture();
        let report = compute_report(&data, ReportMode::RecessionPeriod, None).unwrap();
        let rows = &report.views[3].rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].0,
            GroupKey::RateVehicle {
                rate: 5.0,
                vehicle_type: "Car".to_string()
            }
        );
        assert_eq!(rows[0].1, 100.0);
        assert_eq!(
            rows[1].0,
            GroupKey::RateVehicle {
                rate: 5.5,
                vehicle_type: "Truck".to_string()
            }
        );
        assert_eq!(
            rows[2].0,
            GroupKey::RateVehicle {
                rate: 6.0,
                vehicle_type: "Car".to_string()
            }
        );
    }

    #[test]
    fn year_selector_rule() {
        assert!(year_selector_enabled(ReportMode::Yearly));
        assert!(!year_selector_enabled(ReportMode::RecessionPeriod));
    }

    #[test]
    fn yearly_without_year_is_a_contract_violation() {
        let data = fixture();
        let err = compute_report(&data, ReportMode::Yearly, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn out_of_range_year_yields_empty_views_not_errors() {
        let data = fixture();
        let report = compute_report(&data, ReportMode::Yearly, Some(2019)).unwrap();
        assert!(!report.views[0].is_empty()); // whole-history view still populated
        assert!(report.views[1].is_empty());
        assert!(report.views[2].is_empty());
        assert!(report.views[3].is_empty());
    }

    #[test]
    fn two_row_end_to_end_example() {
        let data = vec![
            record(1980, Month::Jan, true, "Car", 100.0, 10.0, 5.0),
            record(1980, Month::Feb, false, "Car", 200.0, 20.0, 5.0),
        ];

        let recession = compute_report(&data, ReportMode::RecessionPeriod, None).unwrap();
        assert_eq!(
            recession.views[1].rows,
            vec![(GroupKey::VehicleType("Car".to_string()), 100.0)]
        );

        let yearly = compute_report(&data, ReportMode::Yearly, Some(1980)).unwrap();
        assert_eq!(
            yearly.views[1].rows,
            vec![
                (GroupKey::Month(Month::Jan), 100.0),
                (GroupKey::Month(Month::Feb), 200.0),
            ]
        );
    }
}
