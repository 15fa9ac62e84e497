//! Per-author aggregation

use common::models::{AuthorStats, Point};
use common::series::AuthorPoint;

/// Authors need at least this many patches to enter the distribution
/// histogram.
pub const HISTOGRAM_MIN_PATCHES: usize = 10;

/// Group days-to-merge by author. Points without a resolved author are
/// skipped — they only feed author-agnostic series.
pub fn group_by_author(points: &[Point]) -> AuthorStats {
    let mut stats = AuthorStats::default();
    for point in points {
        if let Some(author) = &point.author {
            stats.record(author, point.days_to_merge);
        }
    }
    stats
}

/// Patch count and mean latency per author, for the author scatter.
pub fn author_summary(stats: &AuthorStats) -> Vec<AuthorPoint> {
    stats
        .iter()
        .filter_map(|(author, days)| {
            let avg = stats.mean(author)?;
            Some(AuthorPoint {
                author: author.to_string(),
                patch_count: days.len(),
                avg_days_to_merge: avg,
            })
        })
        .collect()
}

/// Mean latency of every author with at least `min_patches` patches.
pub fn author_histogram(stats: &AuthorStats, min_patches: usize) -> Vec<f64> {
    stats
        .iter()
        .filter(|(_, days)| days.len() >= min_patches)
        .filter_map(|(author, _)| stats.mean(author))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(author: Option<&str>, days_to_merge: i64) -> Point {
        Point {
            date_offset: 0,
            days_to_merge,
            loc: 0,
            author: author.map(str::to_string),
        }
    }

    #[test]
    fn grouping_skips_authorless_points() {
        let points = vec![point(Some("alice"), 2), point(None, 9), point(Some("alice"), 4)];
        let stats = group_by_author(&points);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats.get("alice"), Some(&[2, 4][..]));
    }

    #[test]
    fn summary_has_count_and_mean_per_author() {
        let points = vec![
            point(Some("alice"), 2),
            point(Some("alice"), 4),
            point(Some("bob"), 10),
        ];
        let summary = author_summary(&group_by_author(&points));
        assert_eq!(
            summary,
            vec![
                AuthorPoint {
                    author: "alice".to_string(),
                    patch_count: 2,
                    avg_days_to_merge: 3.0,
                },
                AuthorPoint {
                    author: "bob".to_string(),
                    patch_count: 1,
                    avg_days_to_merge: 10.0,
                },
            ]
        );
    }

    #[test]
    fn histogram_excludes_authors_below_the_patch_floor() {
        let mut points = Vec::new();
        // Author A: 12 patches averaging 3.2 days.
        let a_days = [3, 3, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4];
        for days in a_days {
            points.push(point(Some("a"), days));
        }
        // Author B: only 5 patches.
        for _ in 0..5 {
            points.push(point(Some("b"), 1));
        }

        let histogram = author_histogram(&group_by_author(&points), HISTOGRAM_MIN_PATCHES);
        assert_eq!(histogram.len(), 1);
        assert!((histogram[0] - 3.25).abs() < 1e-9);
    }
}
