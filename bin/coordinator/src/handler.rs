//! Batch handlers registered by the node.

use async_trait::async_trait;
use coordinator_conflation::{BatchHandlerError, ConflatedBatchHandler};
use coordinator_domain::BlocksConflation;
use tracing::info;

/// Logs every conflated batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBatchHandler;

#[async_trait]
impl ConflatedBatchHandler for LoggingBatchHandler {
    async fn handle_conflated_batch(&self, batch: BlocksConflation) -> Result<(), BatchHandlerError> {
        let result = &batch.conflation_result;
        info!(
            target: "coordinator",
            start_block_number = batch.start_block_number(),
            end_block_number = batch.end_block_number(),
            trigger = %result.conflation_trigger,
            data_l1_size = result.data_l1_size,
            blocks = batch.blocks.len(),
            "Batch conflated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator_domain::{Block, ConflationCalculationResult, ConflationTrigger, TracesCounters};

    #[tokio::test]
    async fn test_logging_handler_accepts_batches() {
        let batch = BlocksConflation {
            blocks: vec![Block { number: 1, ..Default::default() }],
            conflation_result: ConflationCalculationResult {
                start_block_number: 1,
                end_block_number: 1,
                conflation_trigger: ConflationTrigger::BlocksLimit,
                traces_counters: TracesCounters::new(),
                data_l1_size: 0,
            },
        };
        assert!(LoggingBatchHandler.handle_conflated_batch(batch).await.is_ok());
    }
}
