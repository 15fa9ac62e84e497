//! Review-service query composition

use common::RunConfig;

/// Compose the Gerrit query string for one run.
///
/// The base clause restricts to merged changes on the main branch of the
/// project. Owners, when given, become one disjunctive parenthesized clause.
/// A recency window becomes `-age:<n>d`: `age:` matches changes idle for at
/// least that long, so its negation keeps only changes active within the
/// last `n` days. Owner identities are passed through verbatim.
pub fn build_query(config: &RunConfig) -> String {
    let mut query = format!(
        "status:merged branch:master project:{}",
        config.project
    );

    if !config.owners.is_empty() {
        let owners = config
            .owners
            .iter()
            .map(|owner| format!("owner:{owner}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        query.push_str(&format!(" ({owners})"));
    }

    if let Some(days) = config.newer_than_days {
        query.push_str(&format!(" -age:{days}d"));
    }

    query
}
