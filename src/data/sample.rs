//! Synthetic sales dataset generation.
//!
//! Useful offline (no network) and for the TUI's resample key: one record per
//! (year, month, vehicle type) over the full selector range, with seasonal
//! and recession effects plus seeded Gaussian noise so runs are reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Month, SalesDataset, SalesRecord, YEAR_MAX, YEAR_MIN};
use crate::error::AppError;

/// Years flagged as recessionary, following US recession history inside the
/// selector range. Flagged at year granularity for simplicity.
const RECESSION_YEARS: [u16; 8] = [1980, 1981, 1982, 1991, 2001, 2008, 2009, 2020];

/// (vehicle type, baseline monthly sales, ad spend per unit sold)
const VEHICLE_BASELINES: [(&str, f64, f64); 5] = [
    ("Supperminicar", 620.0, 1.6),
    ("Smallfamiliycar", 750.0, 2.1),
    ("Mediumfamilycar", 830.0, 2.7),
    ("Executivecar", 410.0, 3.9),
    ("Sports", 260.0, 4.8),
];

/// Sales drop applied to recession months.
const RECESSION_DAMPING: f64 = 0.55;

pub fn is_recession_year(year: u16) -> bool {
    RECESSION_YEARS.contains(&year)
}

/// Generate the full synthetic dataset for a seed.
pub fn generate_sample(seed: u64) -> Result<SalesDataset, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise: Normal<f64> = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut records = Vec::new();

    for year in YEAR_MIN..=YEAR_MAX {
        let recession = is_recession_year(year);

        // Unemployment moves slowly: one base level per year, small monthly
        // wobble, rounded to one decimal so rate groups have repeat members.
        let base_rate = if recession {
            7.5 + 2.0 * noise.sample(&mut rng).abs()
        } else {
            4.0 + 1.0 * noise.sample(&mut rng).abs()
        };

        for month in Month::ALL {
            let seasonal = seasonal_factor(month);
            let rate = round1((base_rate + 0.2 * noise.sample(&mut rng)).clamp(2.0, 14.0));

            for (vehicle_type, base_sales, ad_per_unit) in VEHICLE_BASELINES {
                let damping = if recession { RECESSION_DAMPING } else { 1.0 };
                let sales = (base_sales * seasonal * damping
                    + 40.0 * noise.sample(&mut rng))
                .max(0.0);
                let adspend =
                    (sales * ad_per_unit + 120.0 * noise.sample(&mut rng)).max(0.0);

                records.push(SalesRecord {
                    year,
                    month,
                    recession,
                    vehicle_type: vehicle_type.to_string(),
                    automobile_sales: round1(sales),
                    advertising_expenditure: round1(adspend),
                    unemployment_rate: rate,
                });
            }
        }
    }

    Ok(records)
}

/// Mild spring/autumn peaks, winter trough.
fn seasonal_factor(month: Month) -> f64 {
    match month {
        Month::Jan | Month::Feb => 0.85,
        Month::Mar | Month::Apr | Month::May => 1.10,
        Month::Jun | Month::Jul | Month::Aug => 1.00,
        Month::Sep | Month::Oct => 1.12,
        Month::Nov | Month::Dec => 0.93,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_deterministic_for_a_seed() {
        let a = generate_sample(42).unwrap();
        let b = generate_sample(42).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.automobile_sales, y.automobile_sales);
            assert_eq!(x.unemployment_rate, y.unemployment_rate);
        }

        let c = generate_sample(43).unwrap();
        assert!(a
            .iter()
            .zip(c.iter())
            .any(|(x, y)| x.automobile_sales != y.automobile_sales));
    }

    #[test]
    fn sample_covers_the_full_selector_range() {
        let data = generate_sample(7).unwrap();
        let n_years = (YEAR_MAX - YEAR_MIN + 1) as usize;
        assert_eq!(data.len(), n_years * 12 * VEHICLE_BASELINES.len());
        assert!(data.iter().any(|r| r.year == YEAR_MIN));
        assert!(data.iter().any(|r| r.year == YEAR_MAX));
        assert!(data.iter().any(|r| r.recession));
        assert!(data.iter().any(|r| !r.recession));
    }

    #[test]
    fn sample_fields_stay_in_range() {
        let data = generate_sample(0).unwrap();
        for r in &data {
            assert!(r.automobile_sales >= 0.0);
            assert!(r.advertising_expenditure >= 0.0);
            assert!((2.0..=14.0).contains(&r.unemployment_rate));
            assert_eq!(r.recession, is_recession_year(r.year));
        }
    }
}
