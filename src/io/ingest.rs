//! CSV ingest and normalization.
//!
//! This module is responsible for turning the automobile sales CSV into a
//! clean `SalesDataset` that is safe to aggregate.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Month, SalesDataset, SalesRecord};
use crate::error::AppError;

/// The columns the report engine consumes. Extra columns are ignored.
const REQUIRED_COLUMNS: [&str; 7] = [
    "year",
    "month",
    "recession",
    "vehicle_type",
    "automobile_sales",
    "advertising_expenditure",
    "unemployment_rate",
];

/// Summary stats about the records actually loaded.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_records: usize,
    pub year_min: u16,
    pub year_max: u16,
    pub recession_rows: usize,
    /// Distinct vehicle types, alphabetical.
    pub vehicle_types: Vec<String>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized records + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: SalesDataset,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    /// Wrap an already-validated dataset (synthetic samples, tests).
    pub fn from_records(records: SalesDataset) -> Result<Self, AppError> {
        let stats = compute_stats(&records).ok_or_else(|| {
            AppError::new(3, "Dataset contains no records.")
        })?;
        let rows = records.len();
        Ok(Self {
            records,
            stats,
            row_errors: Vec::new(),
            rows_read: rows,
            rows_used: rows,
        })
    }
}

/// Load and normalize a sales CSV from disk.
pub fn load_sales_csv(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    ingest_sales_csv(file)
}

/// Load and normalize a sales CSV from any reader (file, HTTP body, tests).
pub fn ingest_sales_csv<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = records.len();
    let stats = compute_stats(&records).ok_or_else(|| {
        AppError::new(3, "No valid rows remain after normalization.")
    })?;

    Ok(IngestedData {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Year"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    //
    // The dataset mixes header casing ("Vehicle_Type" vs "unemployment_rate"),
    // so the lookup is case-insensitive.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(*name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("Missing required CSV column(s): {}", missing.join(", ")),
        ))
    }
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<SalesRecord, String> {
    let year_raw = get_required(record, header_map, "year")?;
    let year = year_raw
        .parse::<u16>()
        .map_err(|_| format!("Invalid year '{year_raw}'."))?;

    let month_raw = get_required(record, header_map, "month")?;
    let month =
        Month::parse(month_raw).ok_or_else(|| format!("Unknown month '{month_raw}'."))?;

    let recession = parse_flag(get_required(record, header_map, "recession")?)?;
    let vehicle_type = get_required(record, header_map, "vehicle_type")?.to_string();

    let automobile_sales =
        parse_non_negative(get_required(record, header_map, "automobile_sales")?, "automobile_sales")?;
    let advertising_expenditure = parse_non_negative(
        get_required(record, header_map, "advertising_expenditure")?,
        "advertising_expenditure",
    )?;
    let unemployment_rate = parse_non_negative(
        get_required(record, header_map, "unemployment_rate")?,
        "unemployment_rate",
    )?;

    Ok(SalesRecord {
        year,
        month,
        recession,
        vehicle_type,
        automobile_sales,
        advertising_expenditure,
        unemployment_rate,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Parse the recession flag: the dataset uses 0/1, accept true/false too.
fn parse_flag(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        other => Err(format!("Invalid recession flag '{other}' (expected 0/1).")),
    }
}

fn parse_non_negative(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{s}' for `{name}`."))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("`{name}` must be a non-negative number, got '{s}'."));
    }
    Ok(v)
}

fn compute_stats(records: &[SalesRecord]) -> Option<DatasetStats> {
    if records.is_empty() {
        return None;
    }

    let mut year_min = u16::MAX;
    let mut year_max = u16::MIN;
    let mut recession_rows = 0usize;
    let mut vehicle_types: Vec<String> = Vec::new();

    for r in records {
        year_min = year_min.min(r.year);
        year_max = year_max.max(r.year);
        if r.recession {
            recession_rows += 1;
        }
        if !vehicle_types.contains(&r.vehicle_type) {
            vehicle_types.push(r.vehicle_type.clone());
        }
    }
    vehicle_types.sort();

    Some(DatasetStats {
        n_records: records.len(),
        year_min,
        year_max,
        recession_rows,
        vehicle_types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_CSV: &str = "\
Year,Month,Recession,Vehicle_Type,Automobile_Sales,Advertising_Expenditure,unemployment_rate,City
1980,Jan,1,Supperminicar,612.0,1558.0,5.4,Georgia
1980,Feb,0,Mediumfamilycar,800.5,2100.0,4.2,Georgia
1981,Dec,1,Executivecar,450.25,990.0,6.1,New York
";

    #[test]
    fn ingest_parses_rows_and_ignores_extra_columns() {
        let data = ingest_sales_csv(GOOD_CSV.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 3);
        assert!(data.row_errors.is_empty());

        let first = &data.records[0];
        assert_eq!(first.year, 1980);
        assert_eq!(first.month, Month::Jan);
        assert!(first.recession);
        assert_eq!(first.vehicle_type, "Supperminicar");
        assert_eq!(first.automobile_sales, 612.0);

        assert_eq!(data.stats.year_min, 1980);
        assert_eq!(data.stats.year_max, 1981);
        assert_eq!(data.stats.recession_rows, 2);
        assert_eq!(
            data.stats.vehicle_types,
            vec!["Executivecar", "Mediumfamilycar", "Supperminicar"]
        );
    }

    #[test]
    fn header_lookup_strips_bom_and_ignores_case() {
        let csv = "\u{feff}YEAR,month,RECESSION,vehicle_type,AUTOMOBILE_SALES,Advertising_Expenditure,Unemployment_Rate\n\
                   1990,Mar,0,Sports,120.0,300.0,3.1\n";
        let data = ingest_sales_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.records[0].month, Month::Mar);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let csv = "Year,Month,Vehicle_Type\n1980,Jan,Car\n";
        let err = ingest_sales_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("recession"));
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let csv = "\
Year,Month,Recession,Vehicle_Type,Automobile_Sales,Advertising_Expenditure,unemployment_rate
1980,Jan,1,Car,100.0,10.0,5.0
1980,Smarch,1,Car,100.0,10.0,5.0
1980,Feb,2,Car,100.0,10.0,5.0
1980,Mar,0,Car,-5.0,10.0,5.0
not-a-year,Apr,0,Car,100.0,10.0,5.0
";
        let data = ingest_sales_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 5);
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 4);
        assert_eq!(data.row_errors[0].line, 3);
        assert!(data.row_errors[0].message.contains("Smarch"));
    }

    #[test]
    fn all_rows_invalid_is_a_dataset_error() {
        let csv = "\
Year,Month,Recession,Vehicle_Type,Automobile_Sales,Advertising_Expenditure,unemployment_rate
1980,Nope,1,Car,100.0,10.0,5.0
";
        let err = ingest_sales_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn recession_flag_accepts_words() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag("false").unwrap());
        assert!(parse_flag("yes").is_err());
    }
}
