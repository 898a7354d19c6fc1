//! The conflation service.

use crate::{BlockConflationCalculator, ConflationCalculatorError};
use async_trait::async_trait;
use coordinator_domain::{
    Block, BlockCounters, BlocksConflation, ConflationCalculationResult,
};
use std::{
    collections::{BTreeMap, VecDeque, btree_map::Entry},
    fmt::{Debug, Display},
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error;

/// An error returned when a block cannot be conflated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflationError {
    /// The block and its counters describe different blocks.
    #[error("Block number {block_number} does not match counters block number {counters_block_number}")]
    BlockNumberMismatch {
        /// The number of the block.
        block_number: u64,
        /// The number in the counters.
        counters_block_number: u64,
    },
    /// The block is already pending.
    #[error("Block {0} was already submitted")]
    DuplicateBlock(u64),
    /// The block was already fed to the calculator.
    #[error("Block {block_number} was already conflated, next expected block is {next_expected}")]
    BlockAlreadyConflated {
        /// The submitted block.
        block_number: u64,
        /// The next block the service expects.
        next_expected: u64,
    },
    /// The calculator rejected a block.
    #[error(transparent)]
    Calculator(#[from] ConflationCalculatorError),
}

/// An error returned by a [`ConflatedBatchHandler`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BatchHandlerError(String);

impl BatchHandlerError {
    /// Creates a new [`BatchHandlerError`].
    pub fn new(message: impl Display) -> Self {
        Self(message.to_string())
    }
}

/// Receives every batch closed by the [`ConflationService`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConflatedBatchHandler: Debug + Send + Sync {
    /// Handles a closed batch. Batches are delivered in ascending block order.
    async fn handle_conflated_batch(&self, batch: BlocksConflation) -> Result<(), BatchHandlerError>;
}

/// Receives asynchronous boundary requests, e.g. from the
/// [`TimeDeadlineTrigger`](crate::TimeDeadlineTrigger).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConflationTriggerConsumer: Debug + Send + Sync {
    /// Evaluates the deferred triggers at `now`, in unix seconds, and publishes the batch they
    /// close.
    async fn check_deferred_triggers(&self, now: u64) -> Option<ConflationCalculationResult>;
}

#[derive(Debug)]
struct PendingBlocks {
    blocks: BTreeMap<u64, (Block, BlockCounters)>,
    next_expected: u64,
}

#[derive(Debug)]
struct DrainState<C> {
    calculator: C,
    blocks: VecDeque<Block>,
}

/// Buffers blocks submitted concurrently and out of order, and feeds them one at a time in
/// ascending order to a [`BlockConflationCalculator`].
///
/// Every batch closed by the calculator is assembled from the fed blocks and delivered to the
/// registered [`ConflatedBatchHandler`]s before the next block is fed.
#[derive(Debug)]
pub struct ConflationService<C> {
    pending: Mutex<PendingBlocks>,
    state: tokio::sync::Mutex<DrainState<C>>,
    handlers: Mutex<Vec<Arc<dyn ConflatedBatchHandler>>>,
}

impl<C: BlockConflationCalculator> ConflationService<C> {
    /// Creates a service expecting the block following the calculator's last block.
    pub fn new(calculator: C) -> Self {
        let next_expected = calculator.last_block_number() + 1;
        Self {
            pending: Mutex::new(PendingBlocks { blocks: BTreeMap::new(), next_expected }),
            state: tokio::sync::Mutex::new(DrainState { calculator, blocks: VecDeque::new() }),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a handler. Handlers are invoked in registration order.
    pub fn on_conflated_batch(&self, handler: Arc<dyn ConflatedBatchHandler>) {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner).push(handler);
    }

    /// Returns the number of blocks buffered and not yet fed to the calculator.
    pub fn pending_blocks(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).blocks.len()
    }

    /// Returns the next block the service feeds to the calculator.
    pub fn next_expected_block_number(&self) -> u64 {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).next_expected
    }

    /// Submits a block. Returns once the block is buffered and the drain it triggered, if any,
    /// finished.
    pub async fn new_block(
        &self,
        block: Block,
        counters: BlockCounters,
    ) -> Result<(), ConflationError> {
        if block.number != counters.block_number {
            return Err(ConflationError::BlockNumberMismatch {
                block_number: block.number,
                counters_block_number: counters.block_number,
            });
        }

        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            let block_number = block.number;
            if block_number < pending.next_expected {
                return Err(ConflationError::BlockAlreadyConflated {
                    block_number,
                    next_expected: pending.next_expected,
                });
            }
            match pending.blocks.entry(block_number) {
                Entry::Occupied(_) => return Err(ConflationError::DuplicateBlock(block_number)),
                Entry::Vacant(entry) => {
                    entry.insert((block, counters));
                }
            }
            trace!(target: "conflation", block_number, pending = pending.blocks.len(), "Block buffered");
            coordinator_macros::set!(gauge, crate::Metrics::PENDING_BLOCKS, pending.blocks.len());
        }

        self.drain().await
    }

    async fn drain(&self) -> Result<(), ConflationError> {
        let mut state = self.state.lock().await;

        while let Some((block, counters)) = self.pop_next_expected() {
            let block_number = block.number;
            let result = match state.calculator.new_block(&counters) {
                Ok(result) => result,
                Err(err) => {
                    error!(target: "conflation", block_number, %err, "Calculator rejected block");
                    self.restore(block, counters);
                    return Err(err.into());
                }
            };

            state.blocks.push_back(block);
            if let Some(result) = result {
                let batch = Self::assemble(&mut state.blocks, result);
                self.publish(batch).await;
            }
        }

        Ok(())
    }

    fn pop_next_expected(&self) -> Option<(Block, BlockCounters)> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let next_expected = pending.next_expected;
        let entry = pending.blocks.remove(&next_expected)?;
        pending.next_expected += 1;
        coordinator_macros::set!(gauge, crate::Metrics::PENDING_BLOCKS, pending.blocks.len());
        Some(entry)
    }

    fn restore(&self, block: Block, counters: BlockCounters) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.next_expected = block.number;
        pending.blocks.insert(block.number, (block, counters));
    }

    fn assemble(
        blocks: &mut VecDeque<Block>,
        conflation_result: ConflationCalculationResult,
    ) -> BlocksConflation {
        let mut batch = Vec::with_capacity(conflation_result.blocks_range_len() as usize);
        while blocks.front().is_some_and(|b| b.number <= conflation_result.end_block_number) {
            if let Some(block) = blocks.pop_front() {
                if block.number >= conflation_result.start_block_number {
                    batch.push(block);
                }
            }
        }
        BlocksConflation { blocks: batch, conflation_result }
    }

    async fn publish(&self, batch: BlocksConflation) {
        let result = &batch.conflation_result;
        info!(
            target: "conflation",
            start_block_number = result.start_block_number,
            end_block_number = result.end_block_number,
            trigger = %result.conflation_trigger,
            data_l1_size = result.data_l1_size,
            "Batch conflated"
        );
        coordinator_macros::inc!(
            counter,
            crate::Metrics::CONFLATED_BATCHES,
            "trigger",
            result.conflation_trigger.to_string()
        );
        coordinator_macros::set!(
            gauge,
            crate::Metrics::LAST_CONFLATED_BLOCK,
            result.end_block_number
        );

        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner).clone();
        for handler in handlers {
            if let Err(err) = handler.handle_conflated_batch(batch.clone()).await {
                warn!(
                    target: "conflation",
                    start_block_number = batch.start_block_number(),
                    end_block_number = batch.end_block_number(),
                    %err,
                    "Batch handler failed"
                );
            }
        }
    }
}

#[async_trait]
impl<C: BlockConflationCalculator + Debug + 'static> ConflationTriggerConsumer
    for ConflationService<C>
{
    async fn check_deferred_triggers(&self, now: u64) -> Option<ConflationCalculationResult> {
        let mut state = self.state.lock().await;
        let result = state.calculator.check_deferred_triggers(now)?;
        let batch = Self::assemble(&mut state.blocks, result.clone());
        self.publish(batch).await;
        Some(result)
    }
}
