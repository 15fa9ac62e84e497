//! Percentiles, outlier filtering, smoothing and color mapping

use common::models::{Point, Rgb};

/// Longest smoothing window the trend series will use.
pub const MAX_TREND_WINDOW: usize = 60;
/// Positions covered by fewer samples than this get no trend value.
pub const MIN_TREND_PERIODS: usize = 10;

/// p-th percentile by linear interpolation between order statistics.
/// `None` on an empty sample.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p / 100.0 * (sorted.len() - 1) as f64).clamp(0.0, (sorted.len() - 1) as f64);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        Some(sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo]))
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Drop long-tail outliers: keep points whose `field` value is strictly
/// below the p-th percentile of the *original* sample.
pub fn filter_below_percentile<F>(points: &[Point], field: F, p: f64) -> Vec<Point>
where
    F: Fn(&Point) -> f64,
{
    let values: Vec<f64> = points.iter().map(&field).collect();
    match percentile(&values, p) {
        Some(threshold) => points
            .iter()
            .filter(|point| field(point) < threshold)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// Smoothing window for a series of `len` samples. The `len/10` capped at
/// 60 policy is carried over from the source scripts; the numbers are
/// tunable constants, not invariants.
pub fn trend_window(len: usize) -> usize {
    (len / 10).clamp(1, MAX_TREND_WINDOW)
}

/// Trailing triangular-weighted moving mean.
///
/// Weights peak at the window center and fall off linearly. Positions with
/// fewer than `min_periods` samples available yield `None`; shorter-than-
/// window prefixes past that use the trailing slice of the weight ramp.
pub fn moving_average(series: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let min_periods = min_periods.min(window).max(1);

    let center = (window as f64 - 1.0) / 2.0;
    let denom = (window as f64 + 1.0) / 2.0;
    let weights: Vec<f64> = (0..window)
        .map(|k| 1.0 - (k as f64 - center).abs() / denom)
        .collect();

    (0..series.len())
        .map(|i| {
            let available = (i + 1).min(window);
            if available < min_periods {
                return None;
            }
            let slice = &series[i + 1 - available..=i];
            let tail = &weights[window - available..];
            let weight_sum: f64 = tail.iter().sum();
            let weighted: f64 = slice.iter().zip(tail).map(|(v, w)| v * w).sum();
            Some(weighted / weight_sum)
        })
        .collect()
}

/// Color the LOC scale: green at zero, fully red at or above the baseline
/// (the batch's 75th-percentile LOC). A degenerate baseline renders green.
pub fn color_for(loc: u64, baseline: f64) -> Rgb {
    let ratio = if baseline > 0.0 {
        (loc as f64).min(baseline) / baseline
    } else {
        0.0
    };
    Rgb(ratio, 1.0 - ratio, 0.0)
}
