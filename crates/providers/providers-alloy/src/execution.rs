//! An [`ExecutionClient`] backed by an alloy [`RootProvider`].

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::Bytes;
use alloy_provider::{Provider, RootProvider};
use async_trait::async_trait;
use coordinator_domain::Block;
use coordinator_ingestion::{ClientError, ExecutionClient};
use url::Url;

/// The method returning the RLP encoded block.
const RAW_BLOCK_METHOD: &str = "debug_getRawBlock";

/// Reads blocks from an execution node over JSON-RPC.
///
/// The block header comes from `eth_getBlockByNumber` and the payload from `debug_getRawBlock`,
/// so the node must expose the `debug` namespace.
#[derive(Debug, Clone)]
pub struct AlloyExecutionClient {
    provider: RootProvider,
}

impl AlloyExecutionClient {
    /// Creates a new [`AlloyExecutionClient`] from an existing provider.
    pub const fn new(provider: RootProvider) -> Self {
        Self { provider }
    }

    /// Creates a new [`AlloyExecutionClient`] talking HTTP to `url`.
    pub fn new_http(url: Url) -> Self {
        Self::new(RootProvider::new_http(url))
    }

    async fn raw_block(&self, number: u64) -> Result<Bytes, ClientError> {
        self.provider
            .raw_request(RAW_BLOCK_METHOD.into(), (BlockNumberOrTag::Number(number),))
            .await
            .map_err(|err| ClientError::Rpc(err.to_string()))
    }
}

#[async_trait]
impl ExecutionClient for AlloyExecutionClient {
    async fn block_number(&self) -> Result<u64, ClientError> {
        self.provider.get_block_number().await.map_err(|err| ClientError::Rpc(err.to_string()))
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, ClientError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(|err| ClientError::Rpc(err.to_string()))?
            .ok_or(ClientError::BlockNotFound(number))?;

        let payload = self.raw_block(number).await?;
        trace!(
            target: "providers",
            block_number = number,
            payload_size = payload.len(),
            "Fetched block from execution node"
        );

        Ok(Block {
            number: block.header.number,
            hash: block.header.hash,
            parent_hash: block.header.parent_hash,
            timestamp: block.header.timestamp,
            payload,
        })
    }
}
