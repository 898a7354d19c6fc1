//! Collaborators of the ingestion monitor.

use crate::{BlockCreated, BlockCreationListenerError, ClientError};
use async_trait::async_trait;
use coordinator_domain::Block;
use std::{fmt::Debug, sync::Arc};

/// Read access to the execution chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionClient: Debug + Send + Sync {
    /// Returns the number of the chain head.
    async fn block_number(&self) -> Result<u64, ClientError>;

    /// Returns the block with the given number.
    async fn block_by_number(&self, number: u64) -> Result<Block, ClientError>;
}

#[async_trait]
impl<T: ExecutionClient + ?Sized> ExecutionClient for Arc<T> {
    async fn block_number(&self) -> Result<u64, ClientError> {
        (**self).block_number().await
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, ClientError> {
        (**self).block_by_number(number).await
    }
}

/// Provides the last block covered by a proven aggregation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LastProvenBlockNumberProvider: Debug + Send + Sync {
    /// Returns the last proven block number.
    async fn last_proven_block_number(&self) -> Result<u64, ClientError>;
}

/// Receives the blocks delivered by the ingestion monitor.
///
/// A block may be delivered again after a failure, so implementations must tolerate
/// re-delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockCreationListener: Debug + Send + Sync {
    /// Accepts a newly created block.
    async fn accept_block(&self, event: BlockCreated) -> Result<(), BlockCreationListenerError>;
}

#[async_trait]
impl<T: BlockCreationListener + ?Sized> BlockCreationListener for Arc<T> {
    async fn accept_block(&self, event: BlockCreated) -> Result<(), BlockCreationListenerError> {
        (**self).accept_block(event).await
    }
}
