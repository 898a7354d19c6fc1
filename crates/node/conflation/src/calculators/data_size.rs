//! Bounds the L1 data size of a batch.

use crate::{ConflationCalculator, ConflationCounters};
use coordinator_domain::{BlockCounters, ConflationTrigger};

/// Closes the batch when a block would push its L1 data size above `data_limit` bytes.
#[derive(Debug, Clone)]
pub struct ConflationCalculatorByDataSize {
    data_limit: u32,
    data_size: u32,
}

impl ConflationCalculatorByDataSize {
    /// Creates a new [`ConflationCalculatorByDataSize`].
    pub const fn new(data_limit: u32) -> Self {
        Self { data_limit, data_size: 0 }
    }
}

impl ConflationCalculator for ConflationCalculatorByDataSize {
    fn id(&self) -> &'static str {
        "DATA_LIMIT"
    }

    fn check_overflow(&self, counters: &BlockCounters) -> Option<ConflationTrigger> {
        (self.data_size.saturating_add(counters.l1_data_size) > self.data_limit)
            .then_some(ConflationTrigger::DataLimit)
    }

    fn append_block(&mut self, counters: &BlockCounters) {
        self.data_size = self.data_size.saturating_add(counters.l1_data_size);
    }

    fn reset(&mut self) {
        self.data_size = 0;
    }

    fn copy_counters_to(&self, counters: &mut ConflationCounters) {
        counters.data_size = self.data_size;
    }
}
