//! Conflation calculator traits.

use coordinator_domain::{
    BlockCounters, ConflationCalculationResult, ConflationTrigger, TracesCounters,
};
use std::fmt::Debug;
use thiserror::Error;

/// An error raised while feeding a block to a conflation calculator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflationCalculatorError {
    /// The block does not directly follow the last fed block.
    #[error(
        "Blocks to conflate must be sequential: lastBlockNumber={last_block_number}, new blockNumber={block_number}"
    )]
    UnexpectedBlock {
        /// The last block fed to the calculator.
        last_block_number: u64,
        /// The block that was fed.
        block_number: u64,
    },
}

/// Counters accumulated by the open batch, assembled from every calculator.
///
/// Calculators that do not measure a counter leave it at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflationCounters {
    /// The accumulated L1 data size.
    pub data_size: u32,
    /// The accumulated trace counters.
    pub traces_counters: TracesCounters,
}

/// A synchronous batch boundary strategy.
///
/// The strategy is asked whether appending a block would overflow the open batch before the
/// block is appended.
pub trait ConflationCalculator: Debug + Send {
    /// A short name identifying the strategy in logs.
    fn id(&self) -> &'static str;

    /// Returns the trigger closing the open batch if `counters` cannot be appended to it.
    fn check_overflow(&self, counters: &BlockCounters) -> Option<ConflationTrigger>;

    /// Appends a block to the open batch.
    fn append_block(&mut self, counters: &BlockCounters);

    /// Clears the open batch.
    fn reset(&mut self);

    /// Writes the counters this strategy accumulates for the open batch into `counters`.
    fn copy_counters_to(&self, counters: &mut ConflationCounters);
}

/// A strategy that may close the open batch without a new block, e.g. on a deadline.
pub trait DeferredTriggerConflationCalculator: ConflationCalculator {
    /// Returns the trigger closing the open batch at `now`, in unix seconds.
    fn check_trigger(&self, now: u64) -> Option<ConflationTrigger>;
}

/// Decides where batches end, given blocks in ascending order.
#[cfg_attr(test, mockall::automock)]
pub trait BlockConflationCalculator: Send {
    /// Returns the last block fed to the calculator.
    fn last_block_number(&self) -> u64;

    /// Feeds the next block. Returns the batch closed by this block, which ends at the previous
    /// block.
    fn new_block(
        &mut self,
        counters: &BlockCounters,
    ) -> Result<Option<ConflationCalculationResult>, ConflationCalculatorError>;

    /// Evaluates the deferred triggers at `now`, in unix seconds. Returns the batch closed by a
    /// firing trigger, which ends at the last fed block.
    fn check_deferred_triggers(&mut self, now: u64) -> Option<ConflationCalculationResult>;
}
