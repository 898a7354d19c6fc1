//! Error types for the blob shnarf calculation.

use coordinator_service::WorkerPoolError;
use std::fmt::Display;
use thiserror::Error;

/// An error returned by a [`BlobsRepository`](crate::BlobsRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Blobs repository failure: {0}")]
pub struct BlobsRepositoryError(String);

impl BlobsRepositoryError {
    /// Creates a new [`BlobsRepositoryError`].
    pub fn new(message: impl Display) -> Self {
        Self(message.to_string())
    }
}

/// An error returned by a [`BlobShnarfCalculator`](crate::BlobShnarfCalculator).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Shnarf calculation failed: {0}")]
pub struct ShnarfCalculatorError(String);

impl ShnarfCalculatorError {
    /// Creates a new [`ShnarfCalculatorError`].
    pub fn new(message: impl Display) -> Self {
        Self(message.to_string())
    }
}

/// An error returned by the [`RollingBlobShnarfCalculator`](crate::RollingBlobShnarfCalculator).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShnarfError {
    /// The parent blob is neither cached nor persisted.
    #[error("Failed to find the parent blob in db with end block={end_block_number}")]
    ParentBlobNotFound {
        /// The end block of the missing parent.
        end_block_number: u64,
    },
    /// The blob does not start right after the cached parent.
    #[error(
        "Blob block range start block number={start_block_number} is not equal to parent blob end block number={parent_end_block_number} + 1"
    )]
    UnexpectedBlobRange {
        /// The first block of the submitted blob.
        start_block_number: u64,
        /// The last block of the cached parent.
        parent_end_block_number: u64,
    },
    /// The repository lookup failed.
    #[error(transparent)]
    Repository(#[from] BlobsRepositoryError),
    /// The commitment could not be computed.
    #[error(transparent)]
    Calculator(#[from] ShnarfCalculatorError),
    /// The worker pool could not run the commitment function.
    #[error(transparent)]
    WorkerPool(#[from] WorkerPoolError),
}
