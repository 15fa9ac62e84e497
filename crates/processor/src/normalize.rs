//! Raw-record normalization with explicit fallback policies.
//!
//! The review service has two documented data defects: not every merged
//! patch carries submission metadata, and some records have no owner
//! identity at all. Both are absorbed here, never treated as errors.

use gerrit::types::RawChange;

/// Approval type marking the actual submission of a patch.
pub const SUBMISSION_APPROVAL: &str = "SUBM";

/// Resolved submission time, epoch seconds: the `SUBM` approval's grant
/// time when one exists, else `lastUpdated` (covers both a missing
/// approvals array and an approvals array without a `SUBM` entry).
pub fn submission_timestamp(change: &RawChange) -> i64 {
    change
        .current_patch_set
        .approvals
        .as_deref()
        .and_then(|approvals| {
            approvals
                .iter()
                .find(|approval| approval.kind == SUBMISSION_APPROVAL)
        })
        .map(|approval| approval.granted_on)
        .unwrap_or(change.last_updated)
}

/// Lines of code touched: `max(0, insertions + deletions)`. Deletions come
/// in negative from the wire, so the sum is the net size and can go below
/// zero on its own.
pub fn loc(change: &RawChange) -> u64 {
    (change.current_patch_set.size_insertions + change.current_patch_set.size_deletions).max(0)
        as u64
}

/// Owner identity, when the record has one.
pub fn author(change: &RawChange) -> Option<&str> {
    change.owner.as_ref()?.username.as_deref()
}
