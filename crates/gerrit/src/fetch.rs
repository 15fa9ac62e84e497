//! Paginated review-service fetching.
//!
//! Drives `gerrit query` to completion: each response page is a run of
//! newline-delimited change records followed by one summary line carrying a
//! `moreChanges` flag. Pagination is inherently sequential — every page's
//! `start` offset is the cumulative record count of the pages before it.

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheStore};
use crate::types::{PageSummary, RawChange};

#[derive(Error, Debug)]
pub enum FetchError {
    /// The transport reported an error on some page. Always fatal.
    #[error("review service query failed: {0}")]
    Transport(String),
    #[error("failed to run the query command: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response page: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("response page has no summary line")]
    MissingSummary,
    /// The very first page had zero records.
    #[error("no patches found")]
    NoPatchesFound,
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// One page-level exchange with the review service.
pub trait GerritTransport {
    /// Issue the query at the given `start` offset and return the raw
    /// newline-delimited JSON response.
    async fn query_page(&self, query: &str, start: usize) -> Result<String, FetchError>;
}

/// Production transport: `ssh -p <port> <host> gerrit query ...`.
pub struct SshTransport {
    host: String,
    port: u16,
}

impl SshTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl GerritTransport for SshTransport {
    async fn query_page(&self, query: &str, start: usize) -> Result<String, FetchError> {
        // Parens in the owner clause must survive the remote shell.
        let remote_query = query.replace('(', "\\(").replace(')', "\\)");
        let remote_cmd = format!(
            "gerrit query --format=JSON --current-patch-set --start {start} -- {remote_query}"
        );
        debug!("ssh -p {} {} {remote_cmd}", self.port, self.host);

        let output = Command::new("ssh")
            .arg("-p")
            .arg(self.port.to_string())
            .arg(&self.host)
            .arg(remote_cmd)
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() || !stderr.trim().is_empty() {
            return Err(FetchError::Transport(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Fetch every record matching `query`, consulting the cache first.
///
/// On a cache miss the full paginated fetch runs and the result is written
/// back; this is the cache's sole `put` caller. The returned batch is sorted
/// ascending by `createdOn`.
pub async fn fetch_changes<T: GerritTransport>(
    transport: &T,
    cache: &CacheStore,
    query: &str,
) -> Result<Vec<RawChange>, FetchError> {
    if let Some(cached) = cache.get(query)? {
        info!("Using {} cached records for query", cached.len());
        return Ok(cached);
    }

    let mut data: Vec<RawChange> = Vec::new();
    let mut start = 0;
    loop {
        let page = transport.query_page(query, start).await?;
        let (records, summary) = parse_page(&page)?;
        let page_len = records.len();
        data.extend(records);

        if data.is_empty() {
            return Err(FetchError::NoPatchesFound);
        }
        info!(
            "Found metadata for {page_len} more patches, {} total so far",
            data.len()
        );

        start += page_len;
        if !summary.more_changes {
            break;
        }
        if page_len == 0 {
            // A zero-record page that still claims more changes would loop
            // forever on the same offset.
            warn!("page at offset {start} was empty but claimed more changes, stopping");
            break;
        }
    }

    data.sort_by_key(|change| change.created_on);
    cache.put(query, &data)?;
    Ok(data)
}

/// Split a response page into its change records and trailing summary.
fn parse_page(page: &str) -> Result<(Vec<RawChange>, PageSummary), FetchError> {
    let lines: Vec<&str> = page.lines().filter(|line| !line.trim().is_empty()).collect();
    let (summary_line, record_lines) = lines.split_last().ok_or(FetchError::MissingSummary)?;

    let records = record_lines
        .iter()
        .map(|line| serde_json::from_str(line))
        .collect::<Result<Vec<RawChange>, _>>()?;
    let summary: PageSummary = serde_json::from_str(summary_line)?;
    Ok((records, summary))
}
