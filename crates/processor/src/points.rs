//! Per-patch point derivation

use chrono::{DateTime, NaiveDate};
use gerrit::types::RawChange;
use tracing::{debug, info};

use common::models::Point;

use crate::normalize;
use crate::stats;

/// LOC percentile used as the color-scale baseline (not a filter).
pub const LOC_BASELINE_PERCENTILE: f64 = 75.0;

/// Points derived from one fetched batch, sharing a single time origin.
#[derive(Debug, Clone)]
pub struct DerivedBatch {
    /// Date of the earliest `createdOn` across the whole batch.
    pub origin_date: NaiveDate,
    pub points: Vec<Point>,
    /// 75th percentile of LOC across the whole batch.
    pub loc_baseline: f64,
}

fn date_of(epoch_secs: i64) -> Option<NaiveDate> {
    Some(DateTime::from_timestamp(epoch_secs, 0)?.date_naive())
}

/// Convert a batch of raw records into per-patch points.
///
/// Latency is computed at day granularity by date subtraction. Records
/// whose resolved latency is not positive are dropped — some old records
/// carry a bogus `createdOn`, a known defect of the review service, and
/// clamping them would fabricate data. `None` when no record in the batch
/// has a usable creation date.
pub fn derive_points(batch: &[RawChange]) -> Option<DerivedBatch> {
    let origin_date = batch
        .iter()
        .filter_map(|change| date_of(change.created_on))
        .min()?;

    let locs: Vec<f64> = batch
        .iter()
        .map(|change| normalize::loc(change) as f64)
        .collect();
    let loc_baseline = stats::percentile(&locs, LOC_BASELINE_PERCENTILE).unwrap_or(0.0);
    info!("Lines of code {LOC_BASELINE_PERCENTILE} percentile: {loc_baseline}");

    let mut points = Vec::new();
    for change in batch {
        let Some(creation) = date_of(change.created_on) else {
            continue;
        };
        let Some(submitted) = date_of(normalize::submission_timestamp(change)) else {
            continue;
        };
        let days_to_merge = (submitted - creation).num_days();
        if days_to_merge <= 0 {
            debug!(
                "dropping record created {creation}: non-positive latency {days_to_merge}"
            );
            continue;
        }
        points.push(Point {
            date_offset: (creation - origin_date).num_days(),
            days_to_merge,
            loc: normalize::loc(change),
            author: normalize::author(change).map(str::to_string),
        });
    }

    Some(DerivedBatch {
        origin_date,
        points,
        loc_baseline,
    })
}
