//! Caps the number of blocks per batch.

use crate::{ConflationCalculator, ConflationCounters};
use coordinator_domain::{BlockCounters, ConflationTrigger};

/// Closes the batch once it holds `blocks_limit` blocks.
#[derive(Debug, Clone)]
pub struct ConflationCalculatorByBlockLimit {
    blocks_limit: u32,
    block_count: u32,
}

impl ConflationCalculatorByBlockLimit {
    /// Creates a new [`ConflationCalculatorByBlockLimit`]. A limit of zero is raised to one.
    pub fn new(blocks_limit: u32) -> Self {
        Self { blocks_limit: blocks_limit.max(1), block_count: 0 }
    }
}

impl ConflationCalculator for ConflationCalculatorByBlockLimit {
    fn id(&self) -> &'static str {
        "BLOCKS_LIMIT"
    }

    fn check_overflow(&self, _: &BlockCounters) -> Option<ConflationTrigger> {
        (self.block_count >= self.blocks_limit).then_some(ConflationTrigger::BlocksLimit)
    }

    fn append_block(&mut self, _: &BlockCounters) {
        self.block_count += 1;
    }

    fn reset(&mut self) {
        self.block_count = 0;
    }

    fn copy_counters_to(&self, _: &mut ConflationCounters) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflows_once_limit_is_reached() {
        let mut calculator = ConflationCalculatorByBlockLimit::new(2);
        let counters = BlockCounters::default();

        assert_eq!(calculator.check_overflow(&counters), None);
        calculator.append_block(&counters);
        assert_eq!(calculator.check_overflow(&counters), None);
        calculator.append_block(&counters);
        assert_eq!(calculator.check_overflow(&counters), Some(ConflationTrigger::BlocksLimit));

        calculator.reset();
        assert_eq!(calculator.check_overflow(&counters), None);
    }
}
