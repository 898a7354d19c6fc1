//! Closes batches that stay open for too long.

use crate::{ConflationCalculator, ConflationCounters, DeferredTriggerConflationCalculator};
use coordinator_domain::{BlockCounters, ConflationTrigger};
use std::time::Duration;

/// Configuration of the [`ConflationCalculatorByTimeDeadline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeDeadlineConfig {
    /// How long a batch may stay open, measured from its first block timestamp.
    pub conflation_deadline: Duration,
    /// How often the deadline is checked.
    pub check_interval: Duration,
    /// How long after the last block timestamp the deadline may fire, so that a block being
    /// produced is not cut off.
    pub last_block_confirmation_delay: Duration,
}

/// Fires [`ConflationTrigger::TimeLimit`] once the open batch is older than the configured
/// deadline.
#[derive(Debug, Clone)]
pub struct ConflationCalculatorByTimeDeadline {
    config: TimeDeadlineConfig,
    first_block_timestamp: Option<u64>,
    last_block_timestamp: Option<u64>,
}

impl ConflationCalculatorByTimeDeadline {
    /// Creates a new [`ConflationCalculatorByTimeDeadline`].
    pub const fn new(config: TimeDeadlineConfig) -> Self {
        Self { config, first_block_timestamp: None, last_block_timestamp: None }
    }
}

impl ConflationCalculator for ConflationCalculatorByTimeDeadline {
    fn id(&self) -> &'static str {
        "TIME_LIMIT"
    }

    fn check_overflow(&self, _: &BlockCounters) -> Option<ConflationTrigger> {
        None
    }

    fn append_block(&mut self, counters: &BlockCounters) {
        self.first_block_timestamp.get_or_insert(counters.block_timestamp);
        self.last_block_timestamp = Some(counters.block_timestamp);
    }

    fn reset(&mut self) {
        self.first_block_timestamp = None;
        self.last_block_timestamp = None;
    }

    fn copy_counters_to(&self, _: &mut ConflationCounters) {}
}

impl DeferredTriggerConflationCalculator for ConflationCalculatorByTimeDeadline {
    fn check_trigger(&self, now: u64) -> Option<ConflationTrigger> {
        let first = self.first_block_timestamp?;
        let last = self.last_block_timestamp?;
        let deadline = first.saturating_add(self.config.conflation_deadline.as_secs());
        let confirmed = last.saturating_add(self.config.last_block_confirmation_delay.as_secs());
        (now >= deadline && now >= confirmed).then_some(ConflationTrigger::TimeLimit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(block_timestamp: u64) -> BlockCounters {
        BlockCounters { block_timestamp, ..Default::default() }
    }

    #[test]
    fn test_fires_after_deadline() {
        let mut calculator = ConflationCalculatorByTimeDeadline::new(TimeDeadlineConfig {
            conflation_deadline: Duration::from_secs(10),
            check_interval: Duration::from_secs(1),
            last_block_confirmation_delay: Duration::from_secs(2),
        });
        assert_eq!(calculator.check_trigger(1_000), None);

        calculator.append_block(&block(100));
        calculator.append_block(&block(109));
        assert_eq!(calculator.check_trigger(109), None);
        // Deadline elapsed, but the last block is too recent.
        assert_eq!(calculator.check_trigger(110), None);
        assert_eq!(calculator.check_trigger(111), Some(ConflationTrigger::TimeLimit));

        calculator.reset();
        assert_eq!(calculator.check_trigger(1_000), None);
    }
}
