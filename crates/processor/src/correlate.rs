//! Joining per-author latency with contributor metrics

use std::collections::HashMap;

use stackalytics::EngineerStat;
use tracing::debug;

use common::models::{AuthorStats, CorrelatedPoint};

/// Join each author's mean days-to-merge with their metric value.
///
/// The review service and the metrics service do not share an identity
/// system, so authors missing from `stats` are skipped silently — an
/// expected gap, not an error. Point order follows the author ordering of
/// `author_stats`.
pub fn correlate(author_stats: &AuthorStats, stats: &[EngineerStat]) -> Vec<CorrelatedPoint> {
    let by_id: HashMap<&str, &EngineerStat> =
        stats.iter().map(|stat| (stat.id.as_str(), stat)).collect();

    let mut points = Vec::new();
    for (author, _) in author_stats.iter() {
        let Some(stat) = by_id.get(author) else {
            debug!("author {author} not resolvable in the metrics service, skipping");
            continue;
        };
        let Some(avg) = author_stats.mean(author) else {
            continue;
        };
        points.push(CorrelatedPoint {
            metric_value: stat.metric,
            avg_days_to_merge: avg,
            is_core: stat.is_core(),
        });
    }
    points
}
