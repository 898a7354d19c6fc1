//! Ends batches at operator-configured block numbers.

use crate::{ConflationCalculator, ConflationCounters};
use coordinator_domain::{BlockCounters, ConflationTrigger};
use std::collections::BTreeSet;

/// Closes the batch right after one of the target block numbers was appended.
#[derive(Debug, Clone)]
pub struct ConflationCalculatorByTargetBlockNumbers {
    target_end_block_numbers: BTreeSet<u64>,
    last_block_number: Option<u64>,
}

impl ConflationCalculatorByTargetBlockNumbers {
    /// Creates a new [`ConflationCalculatorByTargetBlockNumbers`].
    pub fn new(target_end_block_numbers: impl IntoIterator<Item = u64>) -> Self {
        Self {
            target_end_block_numbers: target_end_block_numbers.into_iter().collect(),
            last_block_number: None,
        }
    }
}

impl ConflationCalculator for ConflationCalculatorByTargetBlockNumbers {
    fn id(&self) -> &'static str {
        "TARGET_BLOCK_NUMBER"
    }

    fn check_overflow(&self, _: &BlockCounters) -> Option<ConflationTrigger> {
        self.last_block_number
            .is_some_and(|last| self.target_end_block_numbers.contains(&last))
            .then_some(ConflationTrigger::TargetBlockNumber)
    }

    fn append_block(&mut self, counters: &BlockCounters) {
        self.last_block_number = Some(counters.block_number);
    }

    fn reset(&mut self) {
        self.last_block_number = None;
    }

    fn copy_counters_to(&self, _: &mut ConflationCounters) {}
}
