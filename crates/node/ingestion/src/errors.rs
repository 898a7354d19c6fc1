//! Error types for the ingestion monitor.

use alloy_primitives::B256;
use std::fmt::Display;
use thiserror::Error;

/// An error returned by an [`ExecutionClient`](crate::ExecutionClient) or a
/// [`LastProvenBlockNumberProvider`](crate::LastProvenBlockNumberProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request failed in transport or was rejected by the remote.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The requested block does not exist yet.
    #[error("block {0} not found")]
    BlockNotFound(u64),
}

/// An error returned by a [`BlockCreationListener`](crate::BlockCreationListener).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BlockCreationListenerError(String);

impl BlockCreationListenerError {
    /// Creates a new [`BlockCreationListenerError`] from any displayable error.
    pub fn new(err: impl Display) -> Self {
        Self(err.to_string())
    }
}

/// An error ending a tick of the [`BlockCreationMonitor`](crate::BlockCreationMonitor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockCreationMonitorError {
    /// The execution client or the last proven block provider failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The client returned a different block than the one requested.
    #[error("Requested block={requested} but client returned block={returned}")]
    UnexpectedBlock {
        /// The requested block number.
        requested: u64,
        /// The returned block number.
        returned: u64,
    },
    /// The fetched block does not build on the last accepted block.
    #[error(
        "Reorg detected at block={block_number}: parent hash={actual_parent_hash} does not match \
         last accepted hash={expected_parent_hash}, manual intervention is required"
    )]
    ReorgDetected {
        /// The number of the block that does not chain.
        block_number: u64,
        /// The hash of the last accepted block.
        expected_parent_hash: B256,
        /// The parent hash of the fetched block.
        actual_parent_hash: B256,
    },
    /// The listener rejected a block. It is delivered again on the next tick.
    #[error("Listener failed to accept block={block_number}: {source}")]
    Listener {
        /// The rejected block number.
        block_number: u64,
        /// The listener error.
        #[source]
        source: BlockCreationListenerError,
    },
}
