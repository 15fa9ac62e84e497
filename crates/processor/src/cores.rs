//! Core-reviewer activity.
//!
//! A core reviewer is anyone who has granted a Workflow approval or a ±2
//! Code-Review; they count as active on every day inside their first-to-
//! last grant window.

use std::collections::BTreeMap;

use gerrit::types::{Approval, RawChange};

const DAY_SECS: i64 = 86_400;

fn is_core_grant(approval: &Approval) -> bool {
    match approval.kind.as_str() {
        "Workflow" => true,
        "Code-Review" => {
            let score = approval
                .value
                .as_deref()
                .and_then(|v| v.trim().trim_start_matches('+').parse::<i32>().ok());
            matches!(score, Some(2) | Some(-2))
        }
        _ => false,
    }
}

/// Daily active-core counts over the batch's creation span.
///
/// One entry per whole day from the batch's minimum to maximum `createdOn`
/// inclusive, aligned to the same day axis as the other per-day series.
pub fn core_activity(batch: &[RawChange]) -> Vec<u32> {
    let Some(start) = batch.iter().map(|c| c.created_on).min() else {
        return Vec::new();
    };
    let end = batch.iter().map(|c| c.created_on).max().unwrap_or(start);

    // Approver identity -> (first, last) grant timestamp.
    let mut windows: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for change in batch {
        let Some(approvals) = &change.current_patch_set.approvals else {
            continue;
        };
        for approval in approvals {
            if !is_core_grant(approval) {
                continue;
            }
            let Some(username) = approval.by.as_ref().and_then(|by| by.username.as_deref())
            else {
                continue;
            };
            let window = windows
                .entry(username)
                .or_insert((approval.granted_on, approval.granted_on));
            window.0 = window.0.min(approval.granted_on);
            window.1 = window.1.max(approval.granted_on);
        }
    }

    let mut counts = Vec::new();
    let mut day = start;
    while day <= end {
        let active = windows
            .values()
            .filter(|(min, max)| (*min..=*max).contains(&day))
            .count();
        counts.push(active as u32);
        day += DAY_SECS;
    }
    counts
}
