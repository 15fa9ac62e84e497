//! One-shot pipeline orchestration.
//!
//! The five historical script generations each rebuilt this flow; here it
//! is one pipeline with optional stages (correlation, core activity)
//! selected by configuration. Execution is fully sequential: fetch, derive,
//! aggregate, correlate.

use std::collections::BTreeMap;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use common::series::{MetricCorrelation, PipelineOutput, TimeToMergeSeries, VolumeSeries};
use common::models::{AuthorStats, Point};
use common::RunConfig;
use gerrit::cache::{CacheError, CacheStore};
use gerrit::fetch::{fetch_changes, FetchError, GerritTransport};
use gerrit::types::RawChange;
use stackalytics::{ClientError, Metric, StackalyticsClient};

use crate::authors::{self, HISTOGRAM_MIN_PATCHES};
use crate::cores::core_activity;
use crate::points::derive_points;
use crate::stats::{
    color_for, filter_below_percentile, mean, median, moving_average, trend_window,
    MIN_TREND_PERIODS,
};

/// Outlier percentile applied to `days_to_merge` before building series.
pub const DAYS_TO_MERGE_PERCENTILE: f64 = 95.0;
/// Outlier percentile applied to LOC for the LOC-correlation view.
pub const LOC_FILTER_PERCENTILE: f64 = 95.0;
/// Smoothing window for the patches-per-day trend, in days.
pub const VOLUME_TREND_WINDOW: usize = 30;

const DAY_SECS: i64 = 86_400;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    /// The whole batch derived to nothing; the createdOn timestamps are
    /// likely bogus. There is no partial chart output in this case.
    #[error("could not derive any points from the fetched batch; \
             the createdOn timestamps are likely bogus")]
    NoUsableData,
    #[error(transparent)]
    Correlation(#[from] ClientError),
}

/// The whole run: query, fetch (through the cache), derive, aggregate.
pub struct Pipeline<'a, T: GerritTransport> {
    config: &'a RunConfig,
    transport: T,
    cache: CacheStore,
    metrics: StackalyticsClient,
}

impl<'a, T: GerritTransport> Pipeline<'a, T> {
    pub fn new(
        config: &'a RunConfig,
        transport: T,
        cache: CacheStore,
        metrics: StackalyticsClient,
    ) -> Self {
        Self {
            config,
            transport,
            cache,
            metrics,
        }
    }

    pub async fn run(&self) -> Result<PipelineOutput, PipelineError> {
        let query = gerrit::build_query(self.config);
        info!("{query}");

        let batch = fetch_changes(&self.transport, &self.cache, &query).await?;
        let derived = derive_points(&batch).ok_or(PipelineError::NoUsableData)?;
        if derived.points.is_empty() {
            return Err(PipelineError::NoUsableData);
        }
        let points = &derived.points;

        let time_to_merge = if let Some(days) = self.config.newer_than_days {
            // The long-range trend says nothing over a short recency window.
            info!("Looking at patches newer than {days} days, skipping the trend series");
            None
        } else {
            Some(time_to_merge_series(points, derived.loc_baseline))
        };

        let volume = volume_series(points, &batch, self.config.core_activity);
        let loc_correlation = loc_correlation_series(points);

        let filtered =
            filter_below_percentile(points, |p| p.days_to_merge as f64, DAYS_TO_MERGE_PERCENTILE);
        let author_stats = authors::group_by_author(&filtered);
        let author_summary = authors::author_summary(&author_stats);
        let author_histogram = authors::author_histogram(&author_stats, HISTOGRAM_MIN_PATCHES);

        let correlations = if self.config.correlate {
            self.correlate_all(&author_stats).await?
        } else {
            Vec::new()
        };

        Ok(PipelineOutput {
            project: self.config.project.clone(),
            patch_count: batch.len(),
            point_count: points.len(),
            origin_date: derived.origin_date,
            loc_baseline: derived.loc_baseline,
            time_to_merge,
            volume,
            loc_correlation,
            author_summary,
            author_histogram,
            correlations,
        })
    }

    /// One correlation per metric the contributor-metrics service tracks.
    /// An empty result for a metric/module pair degrades that one view
    /// only.
    async fn correlate_all(
        &self,
        author_stats: &AuthorStats,
    ) -> Result<Vec<MetricCorrelation>, PipelineError> {
        let module = self.config.module().to_string();
        let start_date = self
            .config
            .newer_than_days
            .map(|days| Utc::now().timestamp() - days as i64 * DAY_SECS);

        let mut correlations = Vec::new();
        for metric in Metric::ALL {
            let stats = self
                .metrics
                .engineers(Some(&module), metric, start_date)
                .await?;
            if stats.is_empty() {
                warn!(
                    "No result from the metrics service for module {module} and metric {}",
                    metric.api_name()
                );
            }
            let points = crate::correlate::correlate(author_stats, &stats);
            if points.is_empty() && !stats.is_empty() {
                warn!(
                    "Could not resolve any author by {} in the metrics service",
                    metric.api_name()
                );
            }
            correlations.push(MetricCorrelation {
                metric: metric.api_name().to_string(),
                label: metric.label().to_string(),
                points,
            });
        }
        Ok(correlations)
    }
}

fn time_to_merge_series(points: &[Point], loc_baseline: f64) -> TimeToMergeSeries {
    let filtered =
        filter_below_percentile(points, |p| p.days_to_merge as f64, DAYS_TO_MERGE_PERCENTILE);
    let days: Vec<f64> = filtered.iter().map(|p| p.days_to_merge as f64).collect();

    let window = trend_window(days.len());
    let trend = moving_average(&days, window, MIN_TREND_PERIODS);
    let average_days = mean(&days).unwrap_or(0.0);
    let median_days = median(&days).unwrap_or(0.0);
    info!(
        "Average days to merge patches: {}, median: {}",
        average_days.round(),
        median_days.round()
    );

    let colors = filtered
        .iter()
        .map(|point| color_for(point.loc, loc_baseline))
        .collect();

    TimeToMergeSeries {
        points: filtered,
        colors,
        trend,
        trend_window: window,
        average_days,
        median_days,
    }
}

fn volume_series(points: &[Point], batch: &[RawChange], with_cores: bool) -> VolumeSeries {
    let filtered =
        filter_below_percentile(points, |p| p.days_to_merge as f64, DAYS_TO_MERGE_PERCENTILE);

    let mut per_day: BTreeMap<i64, u64> = BTreeMap::new();
    for point in &filtered {
        *per_day.entry(point.date_offset).or_default() += 1;
    }
    let day_offsets: Vec<i64> = per_day.keys().copied().collect();
    let patch_counts: Vec<u64> = per_day.values().copied().collect();

    let counts: Vec<f64> = patch_counts.iter().map(|&c| c as f64).collect();
    let patch_trend = moving_average(&counts, VOLUME_TREND_WINDOW, MIN_TREND_PERIODS);

    let core_counts = with_cores.then(|| core_activity(batch));

    VolumeSeries {
        day_offsets,
        patch_counts,
        patch_trend,
        trend_window: VOLUME_TREND_WINDOW,
        core_counts,
    }
}

/// Date/LOC scatter input: outliers trimmed independently on both latency
/// and LOC, each against the original sample's percentile.
fn loc_correlation_series(points: &[Point]) -> Vec<Point> {
    let by_days =
        filter_below_percentile(points, |p| p.days_to_merge as f64, DAYS_TO_MERGE_PERCENTILE);
    let loc_values: Vec<f64> = points.iter().map(|p| p.loc as f64).collect();
    match crate::stats::percentile(&loc_values, LOC_FILTER_PERCENTILE) {
        Some(loc_threshold) => by_days
            .into_iter()
            .filter(|point| (point.loc as f64) < loc_threshold)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;
    const T0: i64 = 1_400_000_000;

    /// Serves one scripted response page per offset.
    struct OnePageTransport {
        page: String,
    }

    impl GerritTransport for OnePageTransport {
        async fn query_page(&self, _query: &str, start: usize) -> Result<String, FetchError> {
            assert_eq!(start, 0, "single-page transport queried twice");
            Ok(self.page.clone())
        }
    }

    fn record_line(created_on: i64, submitted_on: i64, loc: i64, author: &str) -> String {
        format!(
            concat!(
                r#"{{"createdOn":{},"lastUpdated":{},"owner":{{"username":"{}"}},"#,
                r#""currentPatchSet":{{"sizeInsertions":{},"sizeDeletions":0,"#,
                r#""approvals":[{{"type":"SUBM","grantedOn":{}}},"#,
                r#"{{"type":"Code-Review","value":"2","grantedOn":{},"by":{{"username":"core1"}}}}]}}}}"#
            ),
            created_on, submitted_on, author, loc, submitted_on, submitted_on
        )
    }

    fn scripted_page(lines: &[String]) -> String {
        let mut all = lines.to_vec();
        all.push(format!(
            r#"{{"type":"stats","rowCount":{},"moreChanges":false}}"#,
            lines.len()
        ));
        all.join("\n") + "\n"
    }

    fn test_config(dir: &std::path::Path) -> RunConfig {
        let mut config = RunConfig::new("openstack/neutron", vec![]);
        config.cache_dir = dir.to_path_buf();
        config.correlate = false; // no network in tests
        config
    }

    fn pipeline_with_page<'a>(
        config: &'a RunConfig,
        page: String,
    ) -> Pipeline<'a, OnePageTransport> {
        let cache = CacheStore::open(&config.cache_dir).unwrap();
        Pipeline::new(
            config,
            OnePageTransport { page },
            cache,
            StackalyticsClient::new(config.stackalytics_url.as_str()),
        )
    }

    #[tokio::test]
    async fn end_to_end_run_produces_all_series() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let lines: Vec<String> = (0..20)
            .map(|i| {
                record_line(
                    T0 + i * DAY,
                    T0 + i * DAY + (2 + i % 3) * DAY,
                    10 * (i + 1),
                    if i % 2 == 0 { "alice" } else { "bob" },
                )
            })
            .collect();
        let pipeline = pipeline_with_page(&config, scripted_page(&lines));

        let output = pipeline.run().await.unwrap();
        assert_eq!(output.patch_count, 20);
        assert_eq!(output.point_count, 20);
        assert_eq!(output.project, "openstack/neutron");

        let ttm = output.time_to_merge.expect("no recency window configured");
        assert_eq!(ttm.points.len(), ttm.colors.len());
        assert_eq!(ttm.points.len(), ttm.trend.len());
        assert!(ttm.points.len() <= 20);
        assert!(ttm.average_days > 0.0);

        assert_eq!(output.volume.day_offsets.len(), output.volume.patch_counts.len());
        // core1 granted +2 across the whole span.
        let cores = output.volume.core_counts.expect("core stage enabled");
        assert!(cores.iter().any(|&c| c > 0));

        assert_eq!(output.author_summary.len(), 2);
        // Correlation stage disabled by configuration.
        assert!(output.correlations.is_empty());
    }

    #[tokio::test]
    async fn recency_window_skips_the_trend_series() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.newer_than_days = Some(30);

        let lines: Vec<String> = (0..5)
            .map(|i| record_line(T0 + i * DAY, T0 + (i + 3) * DAY, 10, "alice"))
            .collect();
        let pipeline = pipeline_with_page(&config, scripted_page(&lines));

        let output = pipeline.run().await.unwrap();
        assert!(output.time_to_merge.is_none());
    }

    #[tokio::test]
    async fn batch_with_only_bogus_timestamps_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        // Every record "merges" before it was created.
        let lines: Vec<String> = (0..3)
            .map(|i| record_line(T0 + i * DAY, T0 + i * DAY - 5 * DAY, 10, "alice"))
            .collect();
        let pipeline = pipeline_with_page(&config, scripted_page(&lines));

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::NoUsableData));
    }

    #[tokio::test]
    async fn disabling_core_activity_drops_the_core_series() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.core_activity = false;

        let lines: Vec<String> = (0..4)
            .map(|i| record_line(T0 + i * DAY, T0 + (i + 2) * DAY, 10, "alice"))
            .collect();
        let pipeline = pipeline_with_page(&config, scripted_page(&lines));

        let output = pipeline.run().await.unwrap();
        assert!(output.volume.core_counts.is_none());
    }
}
