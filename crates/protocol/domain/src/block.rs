//! Execution-layer block types.

use crate::TracesCounters;
use alloy_primitives::{B256, Bytes};

/// A block produced by the execution layer.
///
/// Blocks are immutable once produced. The `payload` carries the block as it will later be
/// compressed into a blob (RLP encoded).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Block {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The hash of the parent block.
    pub parent_hash: B256,
    /// The block timestamp, in seconds.
    pub timestamp: u64,
    /// The encoded block payload.
    pub payload: Bytes,
}

impl Block {
    /// Returns the [`BlockNumberAndHash`] identifying this block.
    pub const fn id(&self) -> BlockNumberAndHash {
        BlockNumberAndHash { number: self.number, hash: self.hash }
    }

    /// Returns true if `parent` is the direct parent of this block.
    pub fn is_child_of(&self, parent: &BlockNumberAndHash) -> bool {
        self.number == parent.number + 1 && self.parent_hash == parent.hash
    }
}

/// A block number paired with its hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{number}:{hash}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockNumberAndHash {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
}

/// Per-block measurements used by the conflation strategies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlockCounters {
    /// The block number these counters were measured for.
    pub block_number: u64,
    /// The block timestamp, in seconds.
    pub block_timestamp: u64,
    /// The trace line counts of every tracing module.
    pub traces_counters: TracesCounters,
    /// The size of the block once posted to L1, in bytes.
    pub l1_data_size: u32,
    /// The RLP encoded block.
    pub block_rlp_encoded: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_is_child_of() {
        let parent = BlockNumberAndHash {
            number: 99,
            hash: b256!("1000000000000000000000000000000000000000000000000000000000000000"),
        };
        let block = Block { number: 100, parent_hash: parent.hash, ..Default::default() };
        assert!(block.is_child_of(&parent));

        let orphan = Block { number: 100, parent_hash: B256::repeat_byte(0xAA), ..Default::default() };
        assert!(!orphan.is_child_of(&parent));

        let skipped = Block { number: 101, parent_hash: parent.hash, ..Default::default() };
        assert!(!skipped.is_child_of(&parent));
    }
}
