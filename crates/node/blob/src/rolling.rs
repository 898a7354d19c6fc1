//! The rolling blob shnarf calculator.

use crate::{BlobShnarfCalculator, BlobsRepository, ShnarfError, ShnarfInput};
use alloy_primitives::{B256, Bytes};
use coordinator_domain::{BlockIntervals, ShnarfResult};
use coordinator_service::WorkerPool;
use std::sync::Arc;

/// The blob a new blob is chained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentBlob {
    /// The last block of the parent blob.
    pub end_block_number: u64,
    /// The data hash of the parent blob.
    pub blob_hash: B256,
    /// The shnarf of the parent blob.
    pub shnarf: B256,
}

/// The commitment of a blob, along with the parent it was chained to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingBlobShnarfResult {
    /// The commitment of the blob.
    pub shnarf_result: ShnarfResult,
    /// The data hash of the parent blob.
    pub parent_blob_hash: B256,
    /// The shnarf of the parent blob.
    pub parent_blob_shnarf: B256,
}

/// Computes the shnarf of consecutive blobs, caching the last computed blob as the parent of the
/// next one.
///
/// The calculator has a single writer: calls must be made sequentially, in block order.
#[derive(Debug)]
pub struct RollingBlobShnarfCalculator<C, R> {
    calculator: Arc<C>,
    repository: R,
    worker_pool: WorkerPool,
    genesis_shnarf: B256,
    genesis_block_number: u64,
    parent: Option<ParentBlob>,
}

impl<C, R> RollingBlobShnarfCalculator<C, R>
where
    C: BlobShnarfCalculator + 'static,
    R: BlobsRepository,
{
    /// Creates a calculator with a cold cache. The first blob of the chain starts after block
    /// `0` and is chained to `genesis_shnarf`.
    pub fn new(calculator: C, repository: R, worker_pool: WorkerPool, genesis_shnarf: B256) -> Self {
        Self {
            calculator: Arc::new(calculator),
            repository,
            worker_pool,
            genesis_shnarf,
            genesis_block_number: 0,
            parent: None,
        }
    }

    /// Sets the block the first blob of the chain starts after.
    pub const fn with_genesis_block_number(mut self, genesis_block_number: u64) -> Self {
        self.genesis_block_number = genesis_block_number;
        self
    }

    /// Returns the cached parent of the next blob, if the cache is warm.
    pub const fn cached_parent(&self) -> Option<ParentBlob> {
        self.parent
    }

    /// Clears the cache. The parent of the next blob is looked up in the repository.
    pub fn reset(&mut self) {
        debug!(target: "shnarf", parent = ?self.parent, "Resetting shnarf cache");
        self.parent = None;
    }

    /// Computes the shnarf of the blob made of the batches in `conflation_order`.
    pub async fn calculate_shnarf(
        &mut self,
        compressed_data: Bytes,
        parent_state_root_hash: B256,
        final_state_root_hash: B256,
        conflation_order: BlockIntervals,
        eip4844_enabled: bool,
    ) -> Result<RollingBlobShnarfResult, ShnarfError> {
        let start_block_number = conflation_order.start_block_number();
        let end_block_number = conflation_order.end_block_number();
        let parent = self.parent_blob(start_block_number).await?;

        let input = ShnarfInput {
            compressed_data,
            parent_state_root_hash,
            final_state_root_hash,
            prev_shnarf: parent.shnarf,
            conflation_order,
            eip4844_enabled,
        };
        let calculator = Arc::clone(&self.calculator);
        let shnarf_result =
            self.worker_pool.execute(move || calculator.calculate_shnarf(input)).await??;

        debug!(
            target: "shnarf",
            start_block_number,
            end_block_number,
            shnarf = %shnarf_result.expected_shnarf,
            parent_shnarf = %parent.shnarf,
            "Blob shnarf calculated"
        );
        coordinator_macros::set!(gauge, crate::Metrics::LAST_BLOB_END_BLOCK, end_block_number);

        self.parent = Some(ParentBlob {
            end_block_number,
            blob_hash: shnarf_result.data_hash,
            shnarf: shnarf_result.expected_shnarf,
        });
        Ok(RollingBlobShnarfResult {
            shnarf_result,
            parent_blob_hash: parent.blob_hash,
            parent_blob_shnarf: parent.shnarf,
        })
    }

    async fn parent_blob(&self, start_block_number: u64) -> Result<ParentBlob, ShnarfError> {
        if let Some(parent) = self.parent {
            if parent.end_block_number.checked_add(1) != Some(start_block_number) {
                return Err(ShnarfError::UnexpectedBlobRange {
                    start_block_number,
                    parent_end_block_number: parent.end_block_number,
                });
            }
            return Ok(parent);
        }

        let Some(parent_end_block_number) = start_block_number.checked_sub(1) else {
            return Err(ShnarfError::ParentBlobNotFound { end_block_number: 0 });
        };
        coordinator_macros::inc!(counter, crate::Metrics::PARENT_BLOB_LOOKUPS);
        match self.repository.find_blob_by_end_block_number(parent_end_block_number).await? {
            Some(record) => Ok(ParentBlob {
                end_block_number: record.end_block_number,
                blob_hash: record.blob_hash,
                shnarf: record.expected_shnarf,
            }),
            None if parent_end_block_number == self.genesis_block_number => {
                info!(
                    target: "shnarf",
                    genesis_block_number = self.genesis_block_number,
                    "Chaining first blob to the genesis shnarf"
                );
                Ok(ParentBlob {
                    end_block_number: self.genesis_block_number,
                    blob_hash: B256::ZERO,
                    shnarf: self.genesis_shnarf,
                })
            }
            None => {
                warn!(
                    target: "shnarf",
                    end_block_number = parent_end_block_number,
                    "Parent blob not found"
                );
                Err(ShnarfError::ParentBlobNotFound { end_block_number: parent_end_block_number })
            }
        }
    }
}
