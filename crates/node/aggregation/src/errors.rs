//! Error types for the proof aggregation coordinator.

use coordinator_domain::{BlobsToAggregate, BlockIntervalsError};
use std::fmt::Display;
use thiserror::Error;

/// An error returned by an [`AggregationsRepository`](crate::AggregationsRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Aggregations repository failure: {0}")]
pub struct AggregationsRepositoryError(String);

impl AggregationsRepositoryError {
    /// Creates a new [`AggregationsRepositoryError`].
    pub fn new(message: impl Display) -> Self {
        Self(message.to_string())
    }
}

/// An error returned by an [`AggregationL2StateProvider`](crate::AggregationL2StateProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch aggregation L2 state: {0}")]
pub struct L2StateError(String);

impl L2StateError {
    /// Creates a new [`L2StateError`].
    pub fn new(message: impl Display) -> Self {
        Self(message.to_string())
    }
}

/// An error returned by a [`ProofAggregationClient`](crate::ProofAggregationClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofAggregationError {
    /// The request could not be delivered or answered.
    #[error("Proof aggregation request failed: {0}")]
    Transport(String),
    /// The prover rejected the request.
    #[error("Proof aggregation rejected: {0}")]
    Rejected(String),
}

/// An error failing the aggregation work of a tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// Reading or writing the repository failed.
    #[error(transparent)]
    Repository(#[from] AggregationsRepositoryError),
    /// The chaining state could not be fetched.
    #[error(transparent)]
    L2State(#[from] L2StateError),
    /// The aggregated proof could not be obtained.
    #[error(transparent)]
    ProofAggregation(#[from] ProofAggregationError),
    /// The proof intervals of the fed blobs are inconsistent.
    #[error(transparent)]
    Intervals(#[from] BlockIntervalsError),
    /// The calculator reported a range the fed blobs do not cover exactly.
    #[error("Fed blobs do not cover aggregation {0}")]
    UncoveredAggregation(BlobsToAggregate),
}
