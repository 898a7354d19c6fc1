//! Wires the coordinator services together.

use crate::{config::CoordinatorConfig, handler::LoggingBatchHandler};
use anyhow::{Context, Result};
use coordinator_conflation::{
    BlockToBatchSubmissionCoordinator, ConflationConfig, ConflationService,
    GlobalBlockConflationCalculator, TimeDeadlineTrigger,
};
use coordinator_ingestion::{BlockCreationMonitor, BlockCreationMonitorConfig, LastProvenBlock};
use coordinator_providers_alloy::{AlloyExecutionClient, AlloyTracesCountersClient};
use coordinator_service::{PeriodicPollingService, SystemClock};
use std::sync::Arc;
use tracing::info;
use url::Url;

type Conflation = ConflationService<GlobalBlockConflationCalculator>;

type Submission = BlockToBatchSubmissionCoordinator<GlobalBlockConflationCalculator, AlloyTracesCountersClient>;

type Monitor = BlockCreationMonitor<AlloyExecutionClient, LastProvenBlock, Submission>;

/// The endpoints and starting point of a [`CoordinatorNode`].
#[derive(Debug, Clone)]
pub struct NodeArgs {
    /// The L2 execution node RPC.
    pub l2_rpc: Url,
    /// The tracing node RPC.
    pub traces_rpc: Url,
    /// The tracing engine version requested from the tracing node.
    pub traces_engine_version: String,
    /// The last block already conflated. Ingestion resumes at the next block.
    pub last_block_number: u64,
    /// The last proven block, bounding how far ingestion runs ahead.
    pub last_proven_block_number: u64,
}

/// The running coordinator services.
#[derive(Debug)]
pub struct CoordinatorNode {
    conflation: Arc<Conflation>,
    monitor: PeriodicPollingService<Monitor>,
    deadline_trigger: Option<PeriodicPollingService<TimeDeadlineTrigger>>,
}

impl CoordinatorNode {
    /// Builds the services and starts polling.
    pub async fn start(config: &CoordinatorConfig, args: NodeArgs) -> Result<Self> {
        let conflation_config = ConflationConfig::from(&config.conflation);
        let conflation =
            Arc::new(ConflationService::new(conflation_config.build(args.last_block_number)));
        conflation.on_conflated_batch(Arc::new(LoggingBatchHandler));

        let traces_client =
            AlloyTracesCountersClient::new_http(args.traces_rpc, args.traces_engine_version);
        let submission =
            BlockToBatchSubmissionCoordinator::new(Arc::clone(&conflation), Arc::new(traces_client));

        let monitor_config = BlockCreationMonitorConfig::from(&config.ingestion);
        let polling_interval = monitor_config.polling_interval;
        let monitor = BlockCreationMonitor::resume_after(
            AlloyExecutionClient::new_http(args.l2_rpc),
            LastProvenBlock::new(args.last_proven_block_number),
            submission,
            monitor_config,
            args.last_block_number,
        )
        .await
        .context("Failed to read the last conflated block")?;

        let mut monitor = PeriodicPollingService::new(monitor, polling_interval);
        monitor.start();

        let deadline_trigger = conflation_config.time_deadline.as_ref().map(|deadline| {
            let trigger = TimeDeadlineTrigger::new(
                Arc::clone(&conflation) as _,
                Arc::new(SystemClock),
            );
            let mut service = PeriodicPollingService::new(trigger, deadline.check_interval);
            service.start();
            service
        });

        info!(
            target: "coordinator",
            last_block_number = args.last_block_number,
            deadline_trigger = deadline_trigger.is_some(),
            "Coordinator started"
        );
        Ok(Self { conflation, monitor, deadline_trigger })
    }

    /// Stops polling, letting in-flight ticks finish.
    pub async fn stop(&mut self) {
        self.monitor.stop().await;
        if let Some(trigger) = self.deadline_trigger.as_mut() {
            trigger.stop().await;
        }
        info!(
            target: "coordinator",
            pending_blocks = self.conflation.pending_blocks(),
            next_expected_block_number = self.conflation.next_expected_block_number(),
            "Coordinator stopped"
        );
    }
}
