//! Computed chart series, the pipeline's output surface.
//!
//! The rendering layer (external to this workspace) consumes these as JSON
//! and turns them into figures; nothing here knows about axes or windows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{CorrelatedPoint, Point, Rgb};

/// Everything one pipeline run computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub project: String,
    /// Raw records fetched from the review service.
    pub patch_count: usize,
    /// Points that survived derivation.
    pub point_count: usize,
    /// Date of the earliest `createdOn` in the batch; all `date_offset`
    /// values count days from here.
    pub origin_date: NaiveDate,
    /// 75th percentile of LOC across the whole batch, for color scaling.
    pub loc_baseline: f64,
    /// Absent when a recency window is configured.
    pub time_to_merge: Option<TimeToMergeSeries>,
    pub volume: VolumeSeries,
    pub loc_correlation: Vec<Point>,
    pub author_summary: Vec<AuthorPoint>,
    /// Mean days-to-merge of each author with enough patches to histogram.
    pub author_histogram: Vec<f64>,
    pub correlations: Vec<MetricCorrelation>,
}

/// Per-patch latency over time with a smoothed trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeToMergeSeries {
    pub points: Vec<Point>,
    /// Color per point, green (small) to red (at or above the LOC baseline).
    pub colors: Vec<Rgb>,
    /// Triangular moving mean of `days_to_merge`, `None` where the window
    /// has too few samples.
    pub trend: Vec<Option<f64>>,
    pub trend_window: usize,
    pub average_days: f64,
    pub median_days: f64,
}

/// Patches per day plus the active-core count on the same day axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSeries {
    /// Sorted unique day offsets that saw at least one patch.
    pub day_offsets: Vec<i64>,
    pub patch_counts: Vec<u64>,
    pub patch_trend: Vec<Option<f64>>,
    pub trend_window: usize,
    /// One entry per day from the batch's first to last creation date,
    /// `None` when the core-activity stage is disabled.
    pub core_counts: Option<Vec<u32>>,
}

/// One author's aggregate for the per-author scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorPoint {
    pub author: String,
    pub patch_count: usize,
    pub avg_days_to_merge: f64,
}

/// Correlation of per-author latency against one contributor metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricCorrelation {
    /// Metric name as the contributor-metrics service knows it.
    pub metric: String,
    /// Human label for the axis.
    pub label: String,
    /// Empty when no identity could be resolved in both systems.
    pub points: Vec<CorrelatedPoint>,
}
