//! Domain models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One accepted patch, reduced to the values the charts are built from.
///
/// `date_offset` is measured in whole days from the earliest `createdOn`
/// date in the fetched batch, so every derived series shares one time
/// origin. A point only exists when `days_to_merge > 0`; records with
/// non-positive latency carry bogus timestamps and are dropped during
/// derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub date_offset: i64,
    pub days_to_merge: i64,
    pub loc: u64,
    /// Absent when the review service has no owner identity for the record.
    /// Such points still feed author-agnostic series but never per-author
    /// grouping.
    pub author: Option<String>,
}

/// An (r, g, b) color in [0, 1] per channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f64, pub f64, pub f64);

/// Days-to-merge samples grouped by author, in batch order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorStats {
    by_author: BTreeMap<String, Vec<i64>>,
}

impl AuthorStats {
    pub fn record(&mut self, author: &str, days_to_merge: i64) {
        self.by_author
            .entry(author.to_string())
            .or_default()
            .push(days_to_merge);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.by_author.iter().map(|(a, d)| (a.as_str(), d.as_slice()))
    }

    pub fn get(&self, author: &str) -> Option<&[i64]> {
        self.by_author.get(author).map(Vec::as_slice)
    }

    /// Arithmetic mean of the author's days-to-merge samples.
    pub fn mean(&self, author: &str) -> Option<f64> {
        let days = self.by_author.get(author)?;
        if days.is_empty() {
            return None;
        }
        Some(days.iter().sum::<i64>() as f64 / days.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.by_author.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_author.is_empty()
    }
}

/// One author resolved in both the latency data and the contributor-metrics
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPoint {
    pub metric_value: f64,
    pub avg_days_to_merge: f64,
    pub is_core: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_stats_mean() {
        let mut stats = AuthorStats::default();
        stats.record("alice", 3);
        stats.record("alice", 5);
        assert_eq!(stats.mean("alice"), Some(4.0));
        assert_eq!(stats.mean("bob"), None);
    }

    #[test]
    fn author_stats_keeps_insertion_order_per_author() {
        let mut stats = AuthorStats::default();
        stats.record("alice", 7);
        stats.record("alice", 1);
        assert_eq!(stats.get("alice"), Some(&[7, 1][..]));
    }
}
