//! The shared aggregation poll cursor.

use crate::ProvenAggregationConsumer;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// The first block the aggregation coordinator polls proven blobs from, shared between the
/// coordinator and its owner.
///
/// Only moves forward.
#[derive(Debug, Clone)]
pub struct AggregationPollCursor(Arc<AtomicU64>);

impl AggregationPollCursor {
    /// Creates a cursor at `next_block_number_to_poll`.
    pub fn new(next_block_number_to_poll: u64) -> Self {
        Self(Arc::new(AtomicU64::new(next_block_number_to_poll)))
    }

    /// Returns the next block number to poll.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Moves the cursor past `end_block_number`, the last block of a proven aggregation.
    pub fn advance_past(&self, end_block_number: u64) {
        self.0.fetch_max(end_block_number.saturating_add(1), Ordering::AcqRel);
    }
}

impl ProvenAggregationConsumer for AggregationPollCursor {
    fn on_proven_aggregation(&self, end_block_number: u64) {
        self.advance_past(end_block_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_only_moves_forward() {
        let cursor = AggregationPollCursor::new(10);
        let shared = cursor.clone();

        shared.advance_past(33);
        assert_eq!(cursor.get(), 34);
        shared.advance_past(20);
        assert_eq!(cursor.get(), 34);
    }

    #[test]
    fn test_cursor_follows_proven_aggregations() {
        let cursor = AggregationPollCursor::new(1);
        let consumer: &dyn ProvenAggregationConsumer = &cursor;

        consumer.on_proven_aggregation(10);
        assert_eq!(cursor.get(), 11);
    }
}
