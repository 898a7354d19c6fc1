//! A shared last proven block number.

use crate::{ClientError, LastProvenBlockNumberProvider};
use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// The last proven block number, shared between the component that proves blocks and the
/// ingestion monitor.
///
/// Clones share the same value. Updates never move it backwards.
#[derive(Debug, Clone, Default)]
pub struct LastProvenBlock(Arc<AtomicU64>);

impl LastProvenBlock {
    /// Creates a new [`LastProvenBlock`] starting at `block_number`.
    pub fn new(block_number: u64) -> Self {
        Self(Arc::new(AtomicU64::new(block_number)))
    }

    /// A value that never bounds ingestion.
    pub fn unbounded() -> Self {
        Self::new(u64::MAX)
    }

    /// Returns the current value.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Raises the value to `block_number`. Lower values are ignored.
    pub fn update(&self, block_number: u64) {
        self.0.fetch_max(block_number, Ordering::AcqRel);
    }
}

#[async_trait]
impl LastProvenBlockNumberProvider for LastProvenBlock {
    async fn last_proven_block_number(&self) -> Result<u64, ClientError> {
        Ok(self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_is_monotonic_and_shared() {
        let proven = LastProvenBlock::new(10);
        let shared = proven.clone();

        shared.update(15);
        assert_eq!(proven.get(), 15);

        shared.update(12);
        assert_eq!(proven.last_proven_block_number().await, Ok(15));
    }
}
