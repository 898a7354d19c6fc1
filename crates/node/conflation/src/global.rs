//! Composition of the boundary strategies.

use crate::{
    BlockConflationCalculator, ConflationCalculator, ConflationCalculatorError,
    ConflationCounters, DeferredTriggerConflationCalculator,
};
use coordinator_domain::{BlockCounters, ConflationCalculationResult, ConflationTrigger};

/// Owns the block cursor and evaluates every strategy on each fed block.
///
/// Before a block is appended, the synchronous strategies are asked in their configured order
/// whether it would overflow the open batch. The first one to answer closes the batch, which
/// then ends at the previous block. All strategies are reset and the block opens the next batch.
#[derive(Debug)]
pub struct GlobalBlockConflationCalculator {
    last_block_number: u64,
    batch_start_block_number: Option<u64>,
    sync_calculators: Vec<Box<dyn ConflationCalculator>>,
    deferred_calculators: Vec<Box<dyn DeferredTriggerConflationCalculator>>,
}

impl GlobalBlockConflationCalculator {
    /// Creates a calculator that expects `last_block_number + 1` as the next block.
    pub fn new(
        last_block_number: u64,
        sync_calculators: Vec<Box<dyn ConflationCalculator>>,
        deferred_calculators: Vec<Box<dyn DeferredTriggerConflationCalculator>>,
    ) -> Self {
        info!(
            target: "conflation",
            last_block_number,
            sync = ?sync_calculators.iter().map(|c| c.id()).collect::<Vec<_>>(),
            deferred = ?deferred_calculators.iter().map(|c| c.id()).collect::<Vec<_>>(),
            "Conflation calculators configured"
        );
        Self { last_block_number, batch_start_block_number: None, sync_calculators, deferred_calculators }
    }

    /// Returns the first block of the open batch, if any block was appended since the last
    /// boundary.
    pub const fn batch_start_block_number(&self) -> Option<u64> {
        self.batch_start_block_number
    }

    fn close_batch(&mut self, trigger: ConflationTrigger) -> Option<ConflationCalculationResult> {
        let start_block_number = self.batch_start_block_number.take()?;

        let mut counters = ConflationCounters::default();
        self.sync_calculators.iter().for_each(|c| c.copy_counters_to(&mut counters));
        self.deferred_calculators.iter().for_each(|c| c.copy_counters_to(&mut counters));
        self.sync_calculators.iter_mut().for_each(|c| c.reset());
        self.deferred_calculators.iter_mut().for_each(|c| c.reset());

        Some(ConflationCalculationResult {
            start_block_number,
            end_block_number: self.last_block_number,
            conflation_trigger: trigger,
            traces_counters: counters.traces_counters,
            data_l1_size: counters.data_size,
        })
    }

    fn append_block(&mut self, counters: &BlockCounters) {
        self.sync_calculators.iter_mut().for_each(|c| c.append_block(counters));
        self.deferred_calculators.iter_mut().for_each(|c| c.append_block(counters));
        self.batch_start_block_number.get_or_insert(counters.block_number);
        self.last_block_number = counters.block_number;
    }
}

impl BlockConflationCalculator for GlobalBlockConflationCalculator {
    fn last_block_number(&self) -> u64 {
        self.last_block_number
    }

    fn new_block(
        &mut self,
        counters: &BlockCounters,
    ) -> Result<Option<ConflationCalculationResult>, ConflationCalculatorError> {
        if counters.block_number != self.last_block_number + 1 {
            return Err(ConflationCalculatorError::UnexpectedBlock {
                last_block_number: self.last_block_number,
                block_number: counters.block_number,
            });
        }

        let overflow = self
            .sync_calculators
            .iter()
            .find_map(|c| c.check_overflow(counters).map(|trigger| (c.id(), trigger)));

        let result = match overflow {
            Some((id, trigger)) if self.batch_start_block_number.is_some() => {
                trace!(target: "conflation", calculator = id, %trigger, "Batch boundary reached");
                self.close_batch(trigger)
            }
            Some((id, trigger)) => {
                warn!(
                    target: "conflation",
                    block_number = counters.block_number,
                    calculator = id,
                    %trigger,
                    "Block alone overflows an empty batch, accepting it"
                );
                None
            }
            None => None,
        };

        self.append_block(counters);
        Ok(result)
    }

    fn check_deferred_triggers(&mut self, now: u64) -> Option<ConflationCalculationResult> {
        self.batch_start_block_number?;
        let trigger = self.deferred_calculators.iter().find_map(|c| c.check_trigger(now))?;
        self.close_batch(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::{
        ConflationCalculatorByBlockLimit, ConflationCalculatorByDataSize,
        ConflationCalculatorByExecutionTraces, ConflationCalculatorByTargetBlockNumbers,
        ConflationCalculatorByTimeDeadline, TimeDeadlineConfig,
    };
    use coordinator_domain::TracesCounters;
    use std::time::Duration;

    fn block(block_number: u64, l1_data_size: u32) -> BlockCounters {
        BlockCounters {
            block_number,
            block_timestamp: block_number,
            traces_counters: TracesCounters::filled(10),
            l1_data_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_emits_previous_range_when_block_overflows() {
        let mut calculator = GlobalBlockConflationCalculator::new(
            0,
            vec![Box::new(ConflationCalculatorByBlockLimit::new(2))],
            vec![],
        );

        assert_eq!(calculator.new_block(&block(1, 10)).unwrap(), None);
        assert_eq!(calculator.new_block(&block(2, 10)).unwrap(), None);
        assert_eq!(
            calculator.new_block(&block(3, 10)).unwrap(),
            Some(ConflationCalculationResult {
                start_block_number: 1,
                end_block_number: 2,
                conflation_trigger: ConflationTrigger::BlocksLimit,
                traces_counters: TracesCounters::new(),
                data_l1_size: 0,
            })
        );
        assert_eq!(calculator.batch_start_block_number(), Some(3));
        assert_eq!(calculator.last_block_number(), 3);
    }

    #[test]
    fn test_rejects_non_sequential_blocks() {
        let mut calculator = GlobalBlockConflationCalculator::new(
            5,
            vec![Box::new(ConflationCalculatorByBlockLimit::new(2))],
            vec![],
        );

        let err = calculator.new_block(&block(7, 0)).unwrap_err();
        assert_eq!(
            err,
            ConflationCalculatorError::UnexpectedBlock { last_block_number: 5, block_number: 7 }
        );
        assert_eq!(
            calculator.new_block(&block(5, 0)).unwrap_err(),
            ConflationCalculatorError::UnexpectedBlock { last_block_number: 5, block_number: 5 }
        );
        assert!(calculator.new_block(&block(6, 0)).is_ok());
    }

    #[test]
    fn test_first_configured_calculator_wins() {
        let mut calculator = GlobalBlockConflationCalculator::new(
            0,
            vec![
                Box::new(ConflationCalculatorByDataSize::new(25)),
                Box::new(ConflationCalculatorByBlockLimit::new(2)),
                Box::new(ConflationCalculatorByExecutionTraces::new(TracesCounters::filled(1_000))),
            ],
            vec![],
        );

        calculator.new_block(&block(1, 10)).unwrap();
        calculator.new_block(&block(2, 10)).unwrap();
        // Block 3 overflows both the data size and the block limit.
        let result = calculator.new_block(&block(3, 10)).unwrap().unwrap();
        assert_eq!(result.conflation_trigger, ConflationTrigger::DataLimit);
        assert_eq!(result.data_l1_size, 20);
        assert_eq!(result.traces_counters, TracesCounters::filled(20));
    }

    #[test]
    fn test_oversized_block_is_accepted_into_empty_batch() {
        let mut calculator = GlobalBlockConflationCalculator::new(
            0,
            vec![Box::new(ConflationCalculatorByDataSize::new(100))],
            vec![],
        );

        assert_eq!(calculator.new_block(&block(1, 500)).unwrap(), None);
        let result = calculator.new_block(&block(2, 1)).unwrap().unwrap();
        assert_eq!((result.start_block_number, result.end_block_number), (1, 1));
        assert_eq!(result.data_l1_size, 500);
    }

    #[test]
    fn test_target_block_numbers() {
        let mut calculator = GlobalBlockConflationCalculator::new(
            0,
            vec![Box::new(ConflationCalculatorByTargetBlockNumbers::new([3]))],
            vec![],
        );

        for number in 1..=3 {
            assert_eq!(calculator.new_block(&block(number, 1)).unwrap(), None);
        }
        let result = calculator.new_block(&block(4, 1)).unwrap().unwrap();
        assert_eq!((result.start_block_number, result.end_block_number), (1, 3));
        assert_eq!(result.conflation_trigger, ConflationTrigger::TargetBlockNumber);
    }

    #[test]
    fn test_deferred_trigger_closes_open_batch() {
        let mut calculator = GlobalBlockConflationCalculator::new(
            0,
            vec![Box::new(ConflationCalculatorByBlockLimit::new(100))],
            vec![Box::new(ConflationCalculatorByTimeDeadline::new(TimeDeadlineConfig {
                conflation_deadline: Duration::from_secs(5),
                check_interval: Duration::from_secs(1),
                last_block_confirmation_delay: Duration::ZERO,
            }))],
        );
        assert_eq!(calculator.check_deferred_triggers(1_000), None);

        calculator.new_block(&block(1, 1)).unwrap();
        calculator.new_block(&block(2, 1)).unwrap();
        assert_eq!(calculator.check_deferred_triggers(5), None);

        let result = calculator.check_deferred_triggers(6).unwrap();
        assert_eq!((result.start_block_number, result.end_block_number), (1, 2));
        assert_eq!(result.conflation_trigger, ConflationTrigger::TimeLimit);
        assert_eq!(calculator.batch_start_block_number(), None);

        // Strategies were reset: the next block opens a fresh batch.
        assert_eq!(calculator.new_block(&block(3, 1)).unwrap(), None);
        assert_eq!(calculator.batch_start_block_number(), Some(3));
        assert_eq!(calculator.check_deferred_triggers(7), None);
    }
}
