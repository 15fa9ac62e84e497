//! Run configuration

use std::path::PathBuf;

pub const DEFAULT_GERRIT_HOST: &str = "review.opendev.org";
pub const DEFAULT_GERRIT_PORT: u16 = 29418;
pub const DEFAULT_STACKALYTICS_URL: &str = "https://www.stackalytics.io/api/1.0";
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Immutable configuration for one pipeline run.
///
/// Built once from CLI arguments (with env fallbacks for the endpoints) and
/// passed by reference into every stage that needs it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Project to query, e.g. `openstack/neutron`.
    pub project: String,
    /// Restrict to these change owners (empty = everyone).
    pub owners: Vec<String>,
    /// Only look at changes active within the last N days.
    pub newer_than_days: Option<u32>,
    /// Debug logging; renderers also use it to decide whether to draw labels.
    pub verbose: bool,
    pub cache_dir: PathBuf,
    pub gerrit_host: String,
    pub gerrit_port: u16,
    pub stackalytics_url: String,
    /// Run the contributor-metrics correlation stage.
    pub correlate: bool,
    /// Compute the daily active-core series.
    pub core_activity: bool,
}

impl RunConfig {
    pub fn new(project: impl Into<String>, owners: Vec<String>) -> Self {
        Self {
            project: project.into(),
            owners,
            newer_than_days: None,
            verbose: false,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            gerrit_host: DEFAULT_GERRIT_HOST.to_string(),
            gerrit_port: DEFAULT_GERRIT_PORT,
            stackalytics_url: DEFAULT_STACKALYTICS_URL.to_string(),
            correlate: true,
            core_activity: true,
        }
    }

    /// Short module name used by the contributor-metrics service, i.e. the
    /// last path segment of the project (`openstack/neutron` -> `neutron`).
    pub fn module(&self) -> &str {
        self.project.rsplit('/').next().unwrap_or(&self.project)
    }
}
