//! Conflation configuration.

use crate::{
    ConflationCalculator, DeferredTriggerConflationCalculator, GlobalBlockConflationCalculator,
    calculators::{
        ConflationCalculatorByBlockLimit, ConflationCalculatorByDataSize,
        ConflationCalculatorByExecutionTraces, ConflationCalculatorByTargetBlockNumbers,
        ConflationCalculatorByTimeDeadline, TimeDeadlineConfig,
    },
};
use coordinator_domain::TracesCounters;

/// Selects the batch boundary strategies. Unset limits disable their strategy.
///
/// Strategies are evaluated in the order of the fields: traces, data size, block count, then
/// target block numbers. The time deadline is a deferred trigger evaluated by the
/// [`TimeDeadlineTrigger`](crate::TimeDeadlineTrigger).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflationConfig {
    /// The per module trace count limits of a batch.
    pub traces_limits: Option<TracesCounters>,
    /// The L1 data size limit of a batch, in bytes.
    pub data_size_limit: Option<u32>,
    /// The maximum number of blocks in a batch.
    pub blocks_limit: Option<u32>,
    /// Block numbers batches must end at.
    pub target_end_block_numbers: Vec<u64>,
    /// The deadline after which an open batch is closed.
    pub time_deadline: Option<TimeDeadlineConfig>,
}

impl ConflationConfig {
    /// Builds a [`GlobalBlockConflationCalculator`] resuming after `last_block_number`.
    pub fn build(&self, last_block_number: u64) -> GlobalBlockConflationCalculator {
        let mut sync_calculators: Vec<Box<dyn ConflationCalculator>> = Vec::new();
        if let Some(limits) = &self.traces_limits {
            sync_calculators.push(Box::new(ConflationCalculatorByExecutionTraces::new(limits.clone())));
        }
        if let Some(limit) = self.data_size_limit {
            sync_calculators.push(Box::new(ConflationCalculatorByDataSize::new(limit)));
        }
        if let Some(limit) = self.blocks_limit {
            sync_calculators.push(Box::new(ConflationCalculatorByBlockLimit::new(limit)));
        }
        if !self.target_end_block_numbers.is_empty() {
            sync_calculators.push(Box::new(ConflationCalculatorByTargetBlockNumbers::new(
                self.target_end_block_numbers.iter().copied(),
            )));
        }

        let deferred_calculators: Vec<Box<dyn DeferredTriggerConflationCalculator>> = self
            .time_deadline
            .iter()
            .map(|config| {
                Box::new(ConflationCalculatorByTimeDeadline::new(config.clone()))
                    as Box<dyn DeferredTriggerConflationCalculator>
            })
            .collect();

        GlobalBlockConflationCalculator::new(last_block_number, sync_calculators, deferred_calculators)
    }
}
