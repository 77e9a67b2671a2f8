//! Continuous (interpolated) percentiles
//!
//! Rank `h = p * (n - 1)` over ascending values, linearly interpolated
//! between the two neighbouring observations. Every component that needs a
//! percentile goes through here so thresholds and group statistics agree.

use crate::error::{AnalyticsError, Result};

/// Sort values ascending in place (NaN sorts last)
pub fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Percentile of already-sorted values
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(AnalyticsError::InvalidPercentile(p));
    }
    let n = sorted.len();
    if n == 0 {
        return Err(AnalyticsError::NoData {
            field: "percentile".to_string(),
        });
    }

    let h = p * (n - 1) as f64;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    let value = sorted[lo] + (sorted[hi] - sorted[lo]) * frac;
    // stay within the bracketing observations under rounding
    Ok(value.max(sorted[lo]).min(sorted[hi]))
}

/// Percentile of unsorted values
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    let mut sorted = values.to_vec();
    sort_values(&mut sorted);
    percentile_sorted(&sorted, p)
}
