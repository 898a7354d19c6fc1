//! Polls the deferred conflation triggers.

use crate::ConflationTriggerConsumer;
use async_trait::async_trait;
use coordinator_service::{Clock, PollingService};
use std::{convert::Infallible, sync::Arc};

/// Asks a [`ConflationTriggerConsumer`] on every tick to close the open batch if its deadline
/// elapsed.
///
/// Meant to be driven by a
/// [`PeriodicPollingService`](coordinator_service::PeriodicPollingService) ticking at
/// [`TimeDeadlineConfig::check_interval`](crate::calculators::TimeDeadlineConfig::check_interval).
#[derive(Debug)]
pub struct TimeDeadlineTrigger {
    consumer: Arc<dyn ConflationTriggerConsumer>,
    clock: Arc<dyn Clock>,
}

impl TimeDeadlineTrigger {
    /// Creates a new [`TimeDeadlineTrigger`].
    pub fn new(consumer: Arc<dyn ConflationTriggerConsumer>, clock: Arc<dyn Clock>) -> Self {
        Self { consumer, clock }
    }
}

#[async_trait]
impl PollingService for TimeDeadlineTrigger {
    type Error = Infallible;

    fn name(&self) -> &'static str {
        "conflation_deadline_trigger"
    }

    async fn action(&mut self) -> Result<(), Self::Error> {
        let now = self.clock.now();
        if let Some(result) = self.consumer.check_deferred_triggers(now).await {
            debug!(
                target: "conflation",
                start_block_number = result.start_block_number,
                end_block_number = result.end_block_number,
                now,
                "Conflation deadline elapsed"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockConflationTriggerConsumer;
    use coordinator_domain::{ConflationCalculationResult, ConflationTrigger, TracesCounters};
    use coordinator_service::{FixedClock, PeriodicPollingService};
    use mockall::predicate::eq;
    use std::time::Duration;

    #[tokio::test]
    async fn test_action_uses_clock() {
        let clock = FixedClock::new(1_700_000_000);
        let mut consumer = MockConflationTriggerConsumer::new();
        consumer.expect_check_deferred_triggers().with(eq(1_700_000_000)).times(1).returning(
            |_| {
                Some(ConflationCalculationResult {
                    start_block_number: 1,
                    end_block_number: 4,
                    conflation_trigger: ConflationTrigger::TimeLimit,
                    traces_counters: TracesCounters::new(),
                    data_l1_size: 0,
                })
            },
        );

        let mut trigger = TimeDeadlineTrigger::new(Arc::new(consumer), Arc::new(clock));
        assert!(trigger.action().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_at_check_interval() {
        let clock = FixedClock::new(10);
        let mut consumer = MockConflationTriggerConsumer::new();
        consumer.expect_check_deferred_triggers().times(3).returning(|_| None);

        let mut service = PeriodicPollingService::new(
            TimeDeadlineTrigger::new(Arc::new(consumer), Arc::new(clock)),
            Duration::from_secs(1),
        );
        service.start();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        service.stop().await;
    }
}
