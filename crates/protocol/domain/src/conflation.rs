//! Conflation results and batch events.

use crate::{Block, TracesCounters};

/// The reason a batch was closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ConflationTrigger {
    /// The L1 data size budget would overflow.
    DataLimit,
    /// A trace counters budget would overflow.
    TracesLimit,
    /// The maximum number of blocks per batch was reached.
    BlocksLimit,
    /// The batch stayed open past its deadline.
    TimeLimit,
    /// An operator-configured target block number was reached.
    TargetBlockNumber,
}

/// The boundary and aggregated counters of one batch.
///
/// Successive results are contiguous and never overlap.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ConflationCalculationResult {
    /// The first block of the batch.
    pub start_block_number: u64,
    /// The last block of the batch.
    pub end_block_number: u64,
    /// What closed the batch.
    pub conflation_trigger: ConflationTrigger,
    /// The sum of the trace counters of every block in the batch.
    pub traces_counters: TracesCounters,
    /// The sum of the L1 data size of every block in the batch.
    pub data_l1_size: u32,
}

impl ConflationCalculationResult {
    /// Returns the number of blocks in the batch.
    pub const fn blocks_range_len(&self) -> u64 {
        self.end_block_number + 1 - self.start_block_number
    }
}

/// A batch event: the blocks of a batch along with its calculation result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BlocksConflation {
    /// The blocks, in ascending order.
    pub blocks: Vec<Block>,
    /// The calculation result that closed the batch.
    pub conflation_result: ConflationCalculationResult,
}

impl BlocksConflation {
    /// Returns the first block number of the batch.
    pub const fn start_block_number(&self) -> u64 {
        self.conflation_result.start_block_number
    }

    /// Returns the last block number of the batch.
    pub const fn end_block_number(&self) -> u64 {
        self.conflation_result.end_block_number
    }
}
