//! Collaborators of the proof aggregation coordinator.

use crate::{AggregationsRepositoryError, L2StateError, ProofAggregationError};
use async_trait::async_trait;
use coordinator_domain::{
    Aggregation, AggregationL2State, BlobAndBatchCounters, BlobCounters, BlobsToAggregate,
    ProofToFinalize, ProofsToAggregate,
};
use std::{
    fmt::{self, Debug},
    sync::Arc,
};

/// Decides where aggregations end, given blobs in ascending order.
#[cfg_attr(test, mockall::automock)]
pub trait AggregationCalculator: Debug + Send + Sync {
    /// Feeds the next blob. Returns the aggregation closed by this blob, if any.
    fn new_blob(&mut self, blob_counters: &BlobCounters) -> Option<BlobsToAggregate>;

    /// Returns the open aggregation if its deadline elapsed at `now`, in unix seconds.
    fn check_deadline(&mut self, now: u64) -> Option<BlobsToAggregate>;

    /// Drops the open aggregation.
    fn reset(&mut self);
}

/// Persistence of proven blobs and aggregations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregationsRepository: Debug + Send + Sync {
    /// Returns the run of consecutive proven blobs starting at or after `from_block_number`,
    /// in ascending order.
    async fn find_consecutive_proven_blobs(
        &self,
        from_block_number: u64,
    ) -> Result<Vec<BlobAndBatchCounters>, AggregationsRepositoryError>;

    /// Persists a proven aggregation.
    async fn save_new_aggregation(
        &self,
        aggregation: Aggregation,
    ) -> Result<(), AggregationsRepositoryError>;
}

/// Provides the chaining state of an aggregation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregationL2StateProvider: Debug + Send + Sync {
    /// Returns the chaining state of the aggregation that ends at `block_number`.
    async fn aggregation_l2_state(&self, block_number: u64)
    -> Result<AggregationL2State, L2StateError>;
}

/// Requests aggregated proofs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProofAggregationClient: Debug + Send + Sync {
    /// Returns the aggregated proof of `proofs_to_aggregate`.
    async fn aggregated_proof(
        &self,
        proofs_to_aggregate: ProofsToAggregate,
    ) -> Result<ProofToFinalize, ProofAggregationError>;
}

/// Receives the last block of every proven aggregation.
pub trait ProvenAggregationConsumer: Send + Sync {
    /// Called once the aggregation ending at `end_block_number` was persisted.
    fn on_proven_aggregation(&self, end_block_number: u64);
}

/// Forwards every proven boundary to several consumers, in registration order.
///
/// Typically chains the [`AggregationPollCursor`](crate::AggregationPollCursor) with the
/// ingestion monitor's last proven block.
#[derive(Default)]
pub struct ProvenAggregationConsumers(Vec<Arc<dyn ProvenAggregationConsumer>>);

impl ProvenAggregationConsumers {
    /// Creates an empty set of consumers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `consumer`.
    pub fn with(mut self, consumer: Arc<dyn ProvenAggregationConsumer>) -> Self {
        self.0.push(consumer);
        self
    }
}

impl fmt::Debug for ProvenAggregationConsumers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvenAggregationConsumers").field("consumers", &self.0.len()).finish()
    }
}

impl ProvenAggregationConsumer for ProvenAggregationConsumers {
    fn on_proven_aggregation(&self, end_block_number: u64) {
        for consumer in &self.0 {
            consumer.on_proven_aggregation(end_block_number);
        }
    }
}

impl<F> ProvenAggregationConsumer for F
where
    F: Fn(u64) + Send + Sync,
{
    fn on_proven_aggregation(&self, end_block_number: u64) {
        self(end_block_number)
    }
}
