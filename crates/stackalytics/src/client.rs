//! REST client for the Stackalytics engineers endpoint

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Stackalytics API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Contributor metrics the service can aggregate per engineer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Review marks.
    Marks,
    Emails,
    FiledBugs,
    ResolvedBugs,
    DraftedBlueprints,
    CompletedBlueprints,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Marks,
        Metric::Emails,
        Metric::FiledBugs,
        Metric::ResolvedBugs,
        Metric::DraftedBlueprints,
        Metric::CompletedBlueprints,
    ];

    /// Name the API expects in the `metric` parameter.
    pub fn api_name(self) -> &'static str {
        match self {
            Metric::Marks => "marks",
            Metric::Emails => "emails",
            Metric::FiledBugs => "filed-bugs",
            Metric::ResolvedBugs => "resolved-bugs",
            Metric::DraftedBlueprints => "bpd",
            Metric::CompletedBlueprints => "bpc",
        }
    }

    /// Human label for chart axes.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Marks => "Reviews",
            Metric::Emails => "Emails",
            Metric::FiledBugs => "Filed Bugs",
            Metric::ResolvedBugs => "Resolved Bugs",
            Metric::DraftedBlueprints => "Drafted Blueprints",
            Metric::CompletedBlueprints => "Completed Blueprints",
        }
    }

    /// Emails are indexed by mailing-list subject, not module, so scoping
    /// the emails metric to a module would miss nearly everything.
    pub fn uses_module_hint(self) -> bool {
        !matches!(self, Metric::Emails)
    }
}

/// One `stats` entry of the engineers response.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineerStat {
    pub id: String,
    pub metric: f64,
    #[serde(default)]
    pub core: Option<String>,
}

impl EngineerStat {
    pub fn is_core(&self) -> bool {
        self.core.as_deref() == Some("master")
    }
}

#[derive(Debug, Deserialize)]
struct EngineersResponse {
    #[serde(default)]
    stats: Vec<EngineerStat>,
}

/// Stackalytics API client
pub struct StackalyticsClient {
    client: reqwest::Client,
    base_url: String,
}

impl StackalyticsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch per-engineer aggregates of `metric`, scoped to `module` when
    /// the metric supports it, optionally bounded below by `start_date`
    /// (epoch seconds). An empty `stats` array is a valid, empty result.
    pub async fn engineers(
        &self,
        module: Option<&str>,
        metric: Metric,
        start_date: Option<i64>,
    ) -> Result<Vec<EngineerStat>, ClientError> {
        let url = format!("{}/stats/engineers", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("release", "all".to_string()),
            ("metric", metric.api_name().to_string()),
        ];
        if metric.uses_module_hint() {
            if let Some(module) = module {
                params.push(("module", module.to_string()));
            }
        }
        if let Some(start_date) = start_date {
            params.push(("start_date", start_date.to_string()));
        }
        debug!("GET {url} {params:?}");

        let resp = self.client.get(&url).query(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EngineersResponse = resp.json().await?;
        Ok(body.stats)
    }
}
