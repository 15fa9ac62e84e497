//! time-to-merge: review-latency series for a Gerrit project

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use common::config::{self, RunConfig};
use gerrit::{CacheStore, SshTransport};
use processor::Pipeline;
use stackalytics::StackalyticsClient;

#[derive(Debug, Parser)]
#[command(
    name = "time-to-merge",
    about = "Compute how long patches took to merge for a Gerrit project (or \
             a subset of its contributors) as chart-ready series. Query \
             results are cached on disk with no timeout; delete the cache \
             entry to force a fresh query."
)]
struct Cli {
    /// Project to query, e.g. openstack/neutron
    project: String,

    /// Zero or more Gerrit usernames to restrict the query to
    owner: Vec<String>,

    /// Only look at patches merged in the last N days
    #[arg(long, value_name = "DAYS")]
    newer_than: Option<u32>,

    /// Debug logging; renderers also use it to draw author names and core
    /// status
    #[arg(long)]
    verbose: bool,

    /// Query-result cache directory
    #[arg(long, value_name = "DIR", default_value = config::DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Write the computed series to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip the contributor-metrics correlation stage
    #[arg(long)]
    skip_correlation: bool,

    /// Skip the daily active-core series
    #[arg(long)]
    skip_core_activity: bool,
}

impl Cli {
    /// One immutable configuration value for the whole run, with env
    /// fallbacks for the service endpoints.
    fn to_config(&self) -> RunConfig {
        let mut config = RunConfig::new(self.project.clone(), self.owner.clone());
        config.newer_than_days = self.newer_than;
        config.verbose = self.verbose;
        config.cache_dir = self.cache_dir.clone();
        config.correlate = !self.skip_correlation;
        config.core_activity = !self.skip_core_activity;

        if let Ok(host) = std::env::var("GERRIT_HOST") {
            config.gerrit_host = host;
        }
        if let Some(port) = std::env::var("GERRIT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            config.gerrit_port = port;
        }
        if let Ok(url) = std::env::var("STACKALYTICS_URL") {
            config.stackalytics_url = url;
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr so the JSON series on stdout stays parseable.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.to_config();

    let cache = CacheStore::open(&config.cache_dir)
        .with_context(|| format!("opening cache dir {}", config.cache_dir.display()))?;
    let transport = SshTransport::new(config.gerrit_host.clone(), config.gerrit_port);
    let metrics = StackalyticsClient::new(config.stackalytics_url.clone());

    let pipeline = Pipeline::new(&config, transport, cache, metrics);
    let series = pipeline.run().await?;

    let json = serde_json::to_string_pretty(&series)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Series written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
