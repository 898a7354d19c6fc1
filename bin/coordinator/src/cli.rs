//! Contains the coordinator CLI.

use crate::{
    config::CoordinatorConfig,
    node::{CoordinatorNode, NodeArgs},
};
use anyhow::Result;
use clap::Parser;
use coordinator_cli::{LogArgs, MetricsArgs, cli_styles};
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

/// The rollup coordinator.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub struct Cli {
    /// Logging arguments.
    #[command(flatten)]
    pub log: LogArgs,
    /// Prometheus arguments.
    #[command(flatten)]
    pub metrics: MetricsArgs,
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long, short = 'c', env = "COORDINATOR_CONFIG")]
    pub config: Option<PathBuf>,
    /// URL of the L2 execution node RPC API.
    #[arg(long = "l2.rpc", env = "COORDINATOR_L2_RPC")]
    pub l2_rpc: Url,
    /// URL of the tracing node RPC API.
    #[arg(long = "traces.rpc", env = "COORDINATOR_TRACES_RPC")]
    pub traces_rpc: Url,
    /// The tracing engine version expected from the tracing node.
    #[arg(long = "traces.engine-version", default_value = "1.0.0", env = "COORDINATOR_TRACES_ENGINE_VERSION")]
    pub traces_engine_version: String,
    /// The last block already conflated. Ingestion resumes at the next block.
    #[arg(long = "start-after-block", default_value_t = 0, env = "COORDINATOR_START_AFTER_BLOCK")]
    pub last_block_number: u64,
    /// The last proven block. Defaults to the start block.
    #[arg(long = "last-proven-block", env = "COORDINATOR_LAST_PROVEN_BLOCK")]
    pub last_proven_block_number: Option<u64>,
}

impl Cli {
    /// Runs the coordinator until ctrl-c is pressed.
    pub fn run(self) -> Result<()> {
        self.log.init_tracing_subscriber(None)?;

        let config = match &self.config {
            Some(path) => {
                debug!(target: "coordinator", path = %path.display(), "Loading config file");
                CoordinatorConfig::load(path)?
            }
            None => CoordinatorConfig::default(),
        };

        Self::tokio_runtime()?.block_on(self.start(config))
    }

    /// Creates a multi-thread tokio runtime with all features enabled.
    pub fn tokio_runtime() -> std::io::Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()
    }

    async fn start(self, config: CoordinatorConfig) -> Result<()> {
        self.metrics.init_metrics(|| {
            coordinator_service::Metrics::init();
            coordinator_ingestion::Metrics::init();
            coordinator_conflation::Metrics::init();
        })?;

        let args = NodeArgs {
            l2_rpc: self.l2_rpc,
            traces_rpc: self.traces_rpc,
            traces_engine_version: self.traces_engine_version,
            last_block_number: self.last_block_number,
            last_proven_block_number: self.last_proven_block_number.unwrap_or(self.last_block_number),
        };
        let mut node = CoordinatorNode::start(&config, args).await?;

        tokio::signal::ctrl_c().await?;
        info!(target: "coordinator", "Received ctrl-c, shutting down");
        node.stop().await;
        Ok(())
    }
}
