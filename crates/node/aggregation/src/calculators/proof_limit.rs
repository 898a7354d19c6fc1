//! Caps the number of proofs per aggregation.

use crate::AggregationCalculator;
use coordinator_domain::{BlobCounters, BlobsToAggregate};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct OpenAggregation {
    start_block_number: u64,
    end_block_number: u64,
    start_block_timestamp: u64,
    proofs_count: u32,
}

/// Closes the aggregation when the next blob would push its proof count above `proofs_limit`.
///
/// Every blob brings one compression proof plus one execution proof per batch. A blob whose own
/// proofs exceed the limit is aggregated alone. With a deadline, the open aggregation is also
/// closed once its first block is older than the deadline.
#[derive(Debug, Clone)]
pub struct AggregationCalculatorByProofLimit {
    proofs_limit: u32,
    deadline: Option<Duration>,
    open: Option<OpenAggregation>,
}

impl AggregationCalculatorByProofLimit {
    /// Creates a new [`AggregationCalculatorByProofLimit`]. A limit of zero is raised to one.
    pub fn new(proofs_limit: u32) -> Self {
        Self { proofs_limit: proofs_limit.max(1), deadline: None, open: None }
    }

    /// Closes open aggregations older than `deadline`.
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the number of proofs of the open aggregation.
    pub fn proofs_count(&self) -> u32 {
        self.open.map(|open| open.proofs_count).unwrap_or_default()
    }

    fn close(&mut self) -> Option<BlobsToAggregate> {
        self.open.take().map(|open| BlobsToAggregate {
            start_block_number: open.start_block_number,
            end_block_number: open.end_block_number,
        })
    }
}

impl AggregationCalculator for AggregationCalculatorByProofLimit {
    fn new_blob(&mut self, blob_counters: &BlobCounters) -> Option<BlobsToAggregate> {
        let blob_proofs = blob_counters.number_of_batches.saturating_add(1);
        let closed = if self.proofs_count().saturating_add(blob_proofs) > self.proofs_limit {
            self.close()
        } else {
            None
        };
        if closed.is_none() && self.open.is_none() && blob_proofs > self.proofs_limit {
            warn!(
                target: "aggregation",
                start_block_number = blob_counters.start_block_number,
                blob_proofs,
                proofs_limit = self.proofs_limit,
                "Blob alone exceeds the proofs limit"
            );
        }

        let open = self.open.get_or_insert(OpenAggregation {
            start_block_number: blob_counters.start_block_number,
            end_block_number: blob_counters.end_block_number,
            start_block_timestamp: blob_counters.start_block_timestamp,
            proofs_count: 0,
        });
        open.end_block_number = blob_counters.end_block_number;
        open.proofs_count = open.proofs_count.saturating_add(blob_proofs);
        closed
    }

    fn check_deadline(&mut self, now: u64) -> Option<BlobsToAggregate> {
        let deadline = self.deadline?;
        let open = self.open?;
        if now < open.start_block_timestamp.saturating_add(deadline.as_secs()) {
            return None;
        }
        debug!(
            target: "aggregation",
            start_block_number = open.start_block_number,
            end_block_number = open.end_block_number,
            "Aggregation deadline elapsed"
        );
        self.close()
    }

    fn reset(&mut self) {
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn blob(start_block_number: u64, end_block_number: u64, number_of_batches: u32) -> BlobCounters {
        BlobCounters {
            number_of_batches,
            start_block_number,
            end_block_number,
            start_block_timestamp: start_block_number,
            end_block_timestamp: end_block_number,
        }
    }

    #[test]
    fn test_closes_before_overflowing_blob() {
        let mut calculator = AggregationCalculatorByProofLimit::new(10);

        assert_eq!(calculator.new_blob(&blob(1, 10, 3)), None);
        assert_eq!(calculator.new_blob(&blob(11, 20, 3)), None);
        assert_eq!(calculator.proofs_count(), 8);
        assert_eq!(
            calculator.new_blob(&blob(21, 30, 3)),
            Some(BlobsToAggregate { start_block_number: 1, end_block_number: 20 })
        );
        assert_eq!(calculator.proofs_count(), 4);
    }

    #[test]
    fn test_blob_exceeding_limit_is_aggregated_alone() {
        let mut calculator = AggregationCalculatorByProofLimit::new(3);

        assert_eq!(calculator.new_blob(&blob(1, 10, 5)), None);
        assert_eq!(
            calculator.new_blob(&blob(11, 12, 0)),
            Some(BlobsToAggregate { start_block_number: 1, end_block_number: 10 })
        );
    }

    #[rstest]
    #[case::before_deadline(109, None)]
    #[case::at_deadline(110, Some(BlobsToAggregate { start_block_number: 100, end_block_number: 120 }))]
    fn test_deadline(#[case] now: u64, #[case] expected: Option<BlobsToAggregate>) {
        let mut calculator =
            AggregationCalculatorByProofLimit::new(100).with_deadline(Duration::from_secs(10));
        assert_eq!(calculator.check_deadline(now), None);

        calculator.new_blob(&blob(100, 110, 1));
        calculator.new_blob(&blob(111, 120, 1));
        assert_eq!(calculator.check_deadline(now), expected);
    }

    #[test]
    fn test_no_deadline_configured() {
        let mut calculator = AggregationCalculatorByProofLimit::new(100);
        calculator.new_blob(&blob(1, 2, 1));
        assert_eq!(calculator.check_deadline(u64::MAX), None);

        calculator.reset();
        assert_eq!(calculator.proofs_count(), 0);
    }
}
