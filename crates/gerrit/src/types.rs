//! Change records as returned by `gerrit query --format=JSON`

use serde::{Deserialize, Serialize};

/// One review-service change record, immutable once fetched.
///
/// Serialize is derived so the disk cache can round-trip fetched batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChange {
    /// Creation time, epoch seconds.
    pub created_on: i64,
    /// Last-touched time, epoch seconds. Fallback submission timestamp for
    /// records with defective approval metadata.
    pub last_updated: i64,
    /// Some old records have no owner identity at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<AccountRef>,
    pub current_patch_set: CurrentPatchSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPatchSet {
    pub size_insertions: i64,
    pub size_deletions: i64,
    /// Not all merged patches carry approvals data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approvals: Option<Vec<Approval>>,
}

/// A reviewer action: Code-Review score, Workflow transition, or the
/// submission marker `SUBM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    #[serde(rename = "type")]
    pub kind: String,
    /// Score as a string, e.g. `"2"` or `"-2"`. Absent for `SUBM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Grant time, epoch seconds.
    pub granted_on: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<AccountRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Trailing summary line of every query response page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    #[serde(default)]
    pub row_count: Option<u64>,
    pub more_changes: bool,
}
