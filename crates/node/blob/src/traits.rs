//! Collaborators of the rolling shnarf calculator.

use crate::{BlobsRepositoryError, ShnarfCalculatorError};
use alloy_primitives::{B256, Bytes};
use async_trait::async_trait;
use coordinator_domain::{BlobRecord, BlockIntervals, ShnarfResult};
use std::fmt::Debug;

/// The inputs of one shnarf computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShnarfInput {
    /// The compressed blob payload.
    pub compressed_data: Bytes,
    /// The state root before the first block of the blob.
    pub parent_state_root_hash: B256,
    /// The state root after the last block of the blob.
    pub final_state_root_hash: B256,
    /// The shnarf of the parent blob.
    pub prev_shnarf: B256,
    /// The batches compressed into the blob.
    pub conflation_order: BlockIntervals,
    /// Whether the blob is submitted as an EIP-4844 blob or as calldata.
    pub eip4844_enabled: bool,
}

/// Computes the commitment of a blob.
///
/// The computation is CPU-heavy and runs on the worker pool.
#[cfg_attr(test, mockall::automock)]
pub trait BlobShnarfCalculator: Debug + Send + Sync {
    /// Computes the commitment of the blob described by `input`.
    fn calculate_shnarf(&self, input: ShnarfInput) -> Result<ShnarfResult, ShnarfCalculatorError>;
}

/// Read access to persisted blobs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobsRepository: Debug + Send + Sync {
    /// Returns the blob ending at `end_block_number`, if any.
    async fn find_blob_by_end_block_number(
        &self,
        end_block_number: u64,
    ) -> Result<Option<BlobRecord>, BlobsRepositoryError>;
}
