//! Formatted terminal output for reports.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{AggregateView, ChartKind, ReportResult, RunConfig};
use crate::io::ingest::IngestedData;

/// Format the run summary (dataset stats + active selectors).
pub fn format_run_summary(ingest: &IngestedData, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== autostats - Automobile Sales Statistics ===\n");
    out.push_str(&format!("Report: {}\n", config.mode.display_name()));
    if let Some(year) = config.year {
        out.push_str(&format!("Year: {year}\n"));
    }
    out.push_str(&format!(
        "Records: n={} | years=[{}, {}] | recession rows={}\n",
        ingest.stats.n_records,
        ingest.stats.year_min,
        ingest.stats.year_max,
        ingest.stats.recession_rows,
    ));
    out.push_str(&format!(
        "Vehicle types: {}\n",
        ingest.stats.vehicle_types.join(", ")
    ));
    if !ingest.row_errors.is_empty() {
        out.push_str(&format!(
            "Skipped rows: {} (of {} read)\n",
            ingest.row_errors.len(),
            ingest.rows_read,
        ));
    }
    out.push('\n');

    out
}

/// Format all four views as aligned tables, in fixed A..D order.
pub fn format_report(report: &ReportResult) -> String {
    let mut out = String::new();

    for (idx, view) in report.views.iter().enumerate() {
        let tag = (b'A' + idx as u8) as char;
        out.push_str(&format!("[{tag}] {} ({})\n", view.title, chart_label(view.chart)));
        out.push_str(&format_view_table(view));
        out.push('\n');
    }

    out
}

fn chart_label(chart: ChartKind) -> &'static str {
    match chart {
        ChartKind::Line => "line",
        ChartKind::Bar => "bar",
        ChartKind::Share => "share",
        ChartKind::GroupedBar => "grouped bar",
    }
}

fn format_view_table(view: &AggregateView) -> String {
    if view.is_empty() {
        return "  (no matching rows)\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("  {:<28} {:>14}\n", "group", "value"));
    out.push_str(&format!("  {:-<28} {:->14}\n", "", ""));

    // Share views additionally print each group's slice of the total.
    let total: f64 = view.rows.iter().map(|(_, v)| v).sum();

    for (key, value) in &view.rows {
        if view.chart == ChartKind::Share && total > 0.0 {
            out.push_str(&format!(
                "  {:<28} {:>14.2}  ({:>5.1}%)\n",
                truncate(&key.label(), 28),
                value,
                100.0 * value / total,
            ));
        } else {
            out.push_str(&format!(
                "  {:<28} {:>14.2}\n",
                truncate(&key.label(), 28),
                value,
            ));
        }
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Month, ReportMode, SalesRecord};
    use crate::report::compute_report;

    fn tiny_dataset() -> Vec<SalesRecord> {
        vec![
            SalesRecord {
                year: 1980,
                month: Month::Jan,
                recession: true,
                vehicle_type: "Car".to_string(),
                automobile_sales: 100.0,
                advertising_expenditure: 10.0,
                unemployment_rate: 5.0,
            },
            SalesRecord {
                year: 1980,
                month: Month::Feb,
                recession: true,
                vehicle_type: "Truck".to_string(),
                automobile_sales: 50.0,
                advertising_expenditure: 30.0,
                unemployment_rate: 5.5,
            },
        ]
    }

    #[test]
    fn report_output_contains_all_four_views() {
        let report = compute_report(&tiny_dataset(), ReportMode::RecessionPeriod, None).unwrap();
        let text = format_report(&report);
        for tag in ["[A]", "[B]", "[C]", "[D]"] {
            assert!(text.contains(tag), "missing {tag}");
        }
        assert!(text.contains("Recession Period"));
    }

    #[test]
    fn share_view_prints_percentages() {
        let report = compute_report(&tiny_dataset(), ReportMode::RecessionPeriod, None).unwrap();
        let text = format_report(&report);
        // Advertising split is 10 vs 30: 25% / 75%.
        assert!(text.contains("25.0%"));
        assert!(text.contains("75.0%"));
    }

    #[test]
    fn empty_views_render_a_placeholder() {
        let report = compute_report(&tiny_dataset(), ReportMode::Yearly, Some(2001)).unwrap();
        let text = format_report(&report);
        assert!(text.contains("(no matching rows)"));
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-ten", 11), "exactly-ten");
        assert_eq!(truncate("Special Purpose Vehicle", 10), "Special P.");
    }
}
