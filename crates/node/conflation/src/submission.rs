//! Bridges the ingestion monitor to the conflation service.

use crate::{BlockConflationCalculator, ConflationService};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use coordinator_domain::{BlockCounters, BlockNumberAndHash, TracesCounters};
use coordinator_ingestion::{BlockCreated, BlockCreationListener, BlockCreationListenerError};
use std::{fmt::Debug, sync::Arc, time::Duration};
use thiserror::Error;

/// The first delay between two traces counters requests for the same block.
const DEFAULT_MIN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// The upper bound of the delay between two traces counters requests for the same block.
const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// An error returned by a [`TracesCountersClient`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TracesCountersError {
    /// The request failed.
    #[error("Traces counters request failed: {0}")]
    Rpc(String),
    /// The node has not traced the block yet.
    #[error("Traces counters not available for block {0}")]
    NotAvailable(BlockNumberAndHash),
    /// The node answered with counters that cannot be used.
    #[error("Invalid traces counters: {0}")]
    Invalid(String),
}

impl TracesCountersError {
    /// Returns true if the same request may succeed later.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::NotAvailable(_))
    }
}

/// The trace counters of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracesCountersResponse {
    /// The per module trace counts.
    pub traces_counters: TracesCounters,
    /// The L1 data size of the block, in bytes.
    pub block_l1_size: u32,
    /// The version of the tracing engine that produced the counters.
    pub traces_engine_version: String,
}

/// Fetches the trace counters of a block.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TracesCountersClient: Debug + Send + Sync {
    /// Returns the trace counters of `block`.
    async fn traces_counters(
        &self,
        block: BlockNumberAndHash,
    ) -> Result<TracesCountersResponse, TracesCountersError>;
}

/// Listens to created blocks, fetches their trace counters and submits them to the
/// [`ConflationService`].
///
/// Every block is handled on its own task so that the trace counters of consecutive blocks are
/// fetched in parallel. The service restores block order.
///
/// A block is accepted before its counters are known, so the monitor never delivers it again.
/// Retryable traces errors are therefore retried with an exponential backoff until they succeed;
/// a tracing node lagging behind delays the block instead of losing it.
#[derive(Debug)]
pub struct BlockToBatchSubmissionCoordinator<C, T> {
    conflation_service: Arc<ConflationService<C>>,
    traces_counters_client: Arc<T>,
    min_retry_delay: Duration,
    max_retry_delay: Duration,
}

impl<C, T> BlockToBatchSubmissionCoordinator<C, T> {
    /// Creates a new [`BlockToBatchSubmissionCoordinator`].
    pub const fn new(
        conflation_service: Arc<ConflationService<C>>,
        traces_counters_client: Arc<T>,
    ) -> Self {
        Self {
            conflation_service,
            traces_counters_client,
            min_retry_delay: DEFAULT_MIN_RETRY_DELAY,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
        }
    }

    /// Sets the bounds of the backoff between two traces counters requests for the same block.
    pub const fn with_retry_delays(mut self, min: Duration, max: Duration) -> Self {
        self.min_retry_delay = min;
        self.max_retry_delay = max;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_retry_delay)
            .with_max_delay(self.max_retry_delay)
            .without_max_times()
    }
}

impl<C, T> BlockToBatchSubmissionCoordinator<C, T>
where
    C: BlockConflationCalculator + 'static,
    T: TracesCountersClient + 'static,
{
    async fn submit(
        conflation_service: Arc<ConflationService<C>>,
        traces_counters_client: Arc<T>,
        backoff: ExponentialBuilder,
        event: BlockCreated,
    ) {
        let block = event.block;
        let block_number = block.number;
        let block_id = block.id();

        let fetch = || traces_counters_client.traces_counters(block_id);
        let response = fetch
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(|err: &TracesCountersError| err.is_retryable())
            .notify(|err: &TracesCountersError, delay: Duration| {
                warn!(
                    target: "conflation",
                    block_number,
                    %err,
                    retry_in = ?delay,
                    "Traces counters not ready, retrying"
                );
                coordinator_macros::inc!(counter, crate::Metrics::TRACES_COUNTERS_RETRIES);
            })
            .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                error!(
                    target: "conflation",
                    block_number,
                    %err,
                    "Failed to fetch traces counters, block cannot be conflated"
                );
                coordinator_macros::inc!(counter, crate::Metrics::TRACES_COUNTERS_FAILURES);
                return;
            }
        };

        let counters = BlockCounters {
            block_number,
            block_timestamp: block.timestamp,
            traces_counters: response.traces_counters,
            l1_data_size: response.block_l1_size,
            block_rlp_encoded: block.payload.clone(),
        };
        if let Err(err) = conflation_service.new_block(block, counters).await {
            error!(target: "conflation", block_number, %err, "Failed to submit block to conflation");
        }
    }
}

#[async_trait]
impl<C, T> BlockCreationListener for BlockToBatchSubmissionCoordinator<C, T>
where
    C: BlockConflationCalculator + Debug + 'static,
    T: TracesCountersClient + 'static,
{
    async fn accept_block(&self, event: BlockCreated) -> Result<(), BlockCreationListenerError> {
        trace!(target: "conflation", block_number = event.block.number, "Block accepted for conflation");
        tokio::spawn(Self::submit(
            Arc::clone(&self.conflation_service),
            Arc::clone(&self.traces_counters_client),
            self.backoff(),
            event,
        ));
        Ok(())
    }
}
