//! The proof aggregation coordinator.

use crate::{
    AggregationCalculator, AggregationError, AggregationL2StateProvider, AggregationPollCursor,
    AggregationsRepository, ProofAggregationClient, ProvenAggregationConsumer,
};
use async_trait::async_trait;
use coordinator_domain::{
    Aggregation, AggregationStatus, BlobAndBatchCounters, BlobsToAggregate, BlockIntervals,
    ProofsToAggregate,
};
use coordinator_service::{Clock, PollingService};
use std::{fmt, sync::Arc};

/// Groups consecutive proven blobs into aggregations and proves them.
///
/// Each tick polls the proven blobs following the last fed one and feeds them to the
/// [`AggregationCalculator`]. When nothing is fed, polling starts after the last aggregation
/// this coordinator persisted, or at the shared [`AggregationPollCursor`] if it is further
/// ahead. Every reported boundary is proven, persisted and reported to the
/// [`ProvenAggregationConsumer`] before the next blob is fed. When a boundary fails, the fed
/// blobs are dropped and the calculator is reset, so the next tick starts over right after the
/// last persisted aggregation.
pub struct ProofAggregationCoordinator<A, R, S, P> {
    calculator: A,
    repository: R,
    l2_state_provider: S,
    proof_aggregation_client: P,
    consumer: Arc<dyn ProvenAggregationConsumer>,
    clock: Arc<dyn Clock>,
    cursor: AggregationPollCursor,
    aggregation_calculator_version: String,
    pending_blobs: Vec<BlobAndBatchCounters>,
    last_fed_end_block_number: Option<u64>,
    last_persisted_end_block_number: Option<u64>,
}

impl<A, R, S, P> fmt::Debug for ProofAggregationCoordinator<A, R, S, P>
where
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofAggregationCoordinator")
            .field("calculator", &self.calculator)
            .field("cursor", &self.cursor)
            .field("pending_blobs", &self.pending_blobs.len())
            .field("last_fed_end_block_number", &self.last_fed_end_block_number)
            .field("last_persisted_end_block_number", &self.last_persisted_end_block_number)
            .finish_non_exhaustive()
    }
}

impl<A, R, S, P> ProofAggregationCoordinator<A, R, S, P>
where
    A: AggregationCalculator,
    R: AggregationsRepository,
    S: AggregationL2StateProvider,
    P: ProofAggregationClient,
{
    /// Creates a new [`ProofAggregationCoordinator`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        calculator: A,
        repository: R,
        l2_state_provider: S,
        proof_aggregation_client: P,
        consumer: Arc<dyn ProvenAggregationConsumer>,
        clock: Arc<dyn Clock>,
        cursor: AggregationPollCursor,
        aggregation_calculator_version: impl Into<String>,
    ) -> Self {
        Self {
            calculator,
            repository,
            l2_state_provider,
            proof_aggregation_client,
            consumer,
            clock,
            cursor,
            aggregation_calculator_version: aggregation_calculator_version.into(),
            pending_blobs: Vec::new(),
            last_fed_end_block_number: None,
            last_persisted_end_block_number: None,
        }
    }

    /// Returns the block the next tick polls proven blobs from.
    pub fn next_block_number_to_poll(&self) -> u64 {
        if let Some(end) = self.last_fed_end_block_number {
            return end + 1;
        }
        let cursor = self.cursor.get();
        self.last_persisted_end_block_number.map_or(cursor, |end| cursor.max(end + 1))
    }

    /// Returns the blobs fed to the calculator and not aggregated yet.
    pub fn pending_blobs(&self) -> &[BlobAndBatchCounters] {
        &self.pending_blobs
    }

    async fn poll(&mut self) -> Result<(), AggregationError> {
        let from_block_number = self.next_block_number_to_poll();
        let blobs = self.repository.find_consecutive_proven_blobs(from_block_number).await?;
        if !blobs.is_empty() {
            trace!(target: "aggregation", from_block_number, blobs = blobs.len(), "Polled proven blobs");
        }

        for blob in blobs {
            let counters = &blob.blob_counters;
            if self.last_fed_end_block_number.is_some_and(|end| counters.start_block_number <= end)
            {
                continue;
            }
            self.last_fed_end_block_number = Some(counters.end_block_number);
            let boundary = self.calculator.new_blob(counters);
            self.pending_blobs.push(blob);

            if let Some(blobs_to_aggregate) = boundary {
                self.aggregate(blobs_to_aggregate).await?;
            }
        }

        if let Some(blobs_to_aggregate) = self.calculator.check_deadline(self.clock.now()) {
            self.aggregate(blobs_to_aggregate).await?;
        }
        Ok(())
    }

    async fn aggregate(&mut self, blobs_to_aggregate: BlobsToAggregate) -> Result<(), AggregationError> {
        let count = self
            .pending_blobs
            .iter()
            .take_while(|b| b.blob_counters.end_block_number <= blobs_to_aggregate.end_block_number)
            .count();
        let blobs = &self.pending_blobs[..count];
        let covered = blobs.first().map(|b| b.blob_counters.start_block_number)
            == Some(blobs_to_aggregate.start_block_number)
            && blobs.last().map(|b| b.blob_counters.end_block_number)
                == Some(blobs_to_aggregate.end_block_number);
        if !covered {
            return Err(AggregationError::UncoveredAggregation(blobs_to_aggregate));
        }

        let proofs_to_aggregate = self.proofs_to_aggregate(blobs_to_aggregate, blobs).await?;
        let batch_count: u64 = blobs.iter().map(|b| u64::from(b.blob_counters.number_of_batches)).sum();

        let proof = self.proof_aggregation_client.aggregated_proof(proofs_to_aggregate).await?;
        let aggregation = Aggregation {
            start_block_number: blobs_to_aggregate.start_block_number,
            end_block_number: blobs_to_aggregate.end_block_number,
            status: AggregationStatus::Proven,
            aggregation_calculator_version: self.aggregation_calculator_version.clone(),
            batch_count,
            aggregation_proof: Some(proof),
        };
        self.repository.save_new_aggregation(aggregation).await?;
        self.pending_blobs.drain(..count);
        self.last_persisted_end_block_number = Some(blobs_to_aggregate.end_block_number);

        info!(
            target: "aggregation",
            start_block_number = blobs_to_aggregate.start_block_number,
            end_block_number = blobs_to_aggregate.end_block_number,
            blobs = count,
            batch_count,
            "Aggregation proven"
        );
        coordinator_macros::inc!(counter, crate::Metrics::PROVEN_AGGREGATIONS);
        coordinator_macros::set!(
            gauge,
            crate::Metrics::LAST_PROVEN_BLOCK,
            blobs_to_aggregate.end_block_number
        );
        self.consumer.on_proven_aggregation(blobs_to_aggregate.end_block_number);
        Ok(())
    }

    async fn proofs_to_aggregate(
        &self,
        blobs_to_aggregate: BlobsToAggregate,
        blobs: &[BlobAndBatchCounters],
    ) -> Result<ProofsToAggregate, AggregationError> {
        let compression_proofs = BlockIntervals::new(
            blobs_to_aggregate.start_block_number,
            blobs.iter().map(|b| b.blob_counters.end_block_number).collect(),
        )?;

        let execution_start = blobs
            .first()
            .map(|b| b.versioned_execution_proofs.execution_proofs.start_block_number())
            .unwrap_or(blobs_to_aggregate.start_block_number);
        let execution_proofs = BlockIntervals::new(
            execution_start,
            blobs
                .iter()
                .flat_map(|b| b.versioned_execution_proofs.execution_proofs.upper_boundaries())
                .copied()
                .collect(),
        )?;
        let execution_versions = blobs
            .iter()
            .flat_map(|b| b.versioned_execution_proofs.execution_versions.iter().cloned())
            .collect();

        let l2_state = self
            .l2_state_provider
            .aggregation_l2_state(blobs_to_aggregate.start_block_number.saturating_sub(1))
            .await?;

        Ok(ProofsToAggregate {
            compression_proofs,
            execution_proofs,
            execution_versions,
            parent_aggregation_last_block_timestamp: l2_state.parent_aggregation_last_block_timestamp,
            parent_aggregation_last_l1_rolling_hash_message_number: l2_state
                .parent_aggregation_last_l1_rolling_hash_message_number,
            parent_aggregation_last_l1_rolling_hash: l2_state.parent_aggregation_last_l1_rolling_hash,
        })
    }

    fn drop_feed_state(&mut self) {
        self.pending_blobs.clear();
        self.last_fed_end_block_number = None;
        self.calculator.reset();
    }
}

#[async_trait]
impl<A, R, S, P> PollingService for ProofAggregationCoordinator<A, R, S, P>
where
    A: AggregationCalculator + 'static,
    R: AggregationsRepository + 'static,
    S: AggregationL2StateProvider + 'static,
    P: ProofAggregationClient + 'static,
{
    type Error = AggregationError;

    fn name(&self) -> &'static str {
        "proof_aggregation_coordinator"
    }

    async fn action(&mut self) -> Result<(), Self::Error> {
        let result = self.poll().await;
        if result.is_err() && self.last_fed_end_block_number.is_some() {
            coordinator_macros::inc!(counter, crate::Metrics::FAILED_AGGREGATIONS);
            self.drop_feed_state();
        }
        result
    }

    fn handle_error(&mut self, error: Self::Error) {
        warn!(
            target: "aggregation",
            next_block_number_to_poll = self.next_block_number_to_poll(),
            %error,
            "Proof aggregation tick failed"
        );
    }
}
