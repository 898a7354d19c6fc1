//! Bounds the trace counters of a batch.

use crate::{ConflationCalculator, ConflationCounters};
use coordinator_domain::{BlockCounters, ConflationTrigger, TracesCounters};

/// Closes the batch when a block would push any module's trace count above its limit.
#[derive(Debug, Clone)]
pub struct ConflationCalculatorByExecutionTraces {
    traces_limits: TracesCounters,
    traces_counters: TracesCounters,
}

impl ConflationCalculatorByExecutionTraces {
    /// Creates a new [`ConflationCalculatorByExecutionTraces`].
    pub const fn new(traces_limits: TracesCounters) -> Self {
        Self { traces_limits, traces_counters: TracesCounters::new() }
    }
}

impl ConflationCalculator for ConflationCalculatorByExecutionTraces {
    fn id(&self) -> &'static str {
        "TRACES_LIMIT"
    }

    fn check_overflow(&self, counters: &BlockCounters) -> Option<ConflationTrigger> {
        let over_limit = (&self.traces_counters + &counters.traces_counters)
            .modules_over_limit(&self.traces_limits);
        if over_limit.is_empty() {
            return None;
        }
        debug!(
            target: "conflation",
            block_number = counters.block_number,
            modules = ?over_limit,
            "Trace counters limit would overflow"
        );
        Some(ConflationTrigger::TracesLimit)
    }

    fn append_block(&mut self, counters: &BlockCounters) {
        self.traces_counters += &counters.traces_counters;
    }

    fn reset(&mut self) {
        self.traces_counters = TracesCounters::new();
    }

    fn copy_counters_to(&self, counters: &mut ConflationCounters) {
        counters.traces_counters = self.traces_counters.clone();
    }
}
