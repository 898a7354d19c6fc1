//! Metrics for the conflation service.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the counter of closed batches, labelled by trigger.
    pub const CONFLATED_BATCHES: &'static str = "coordinator_conflation_batches_total";

    /// Identifier for the gauge of blocks buffered ahead of the next expected block.
    pub const PENDING_BLOCKS: &'static str = "coordinator_conflation_pending_blocks";

    /// Identifier for the gauge tracking the last block of the last closed batch.
    pub const LAST_CONFLATED_BLOCK: &'static str = "coordinator_conflation_last_block";

    /// Identifier for the counter of failed traces counters requests that were retried.
    pub const TRACES_COUNTERS_RETRIES: &'static str = "coordinator_conflation_traces_retries_total";

    /// Identifier for the counter of blocks dropped after a non-retryable traces counters error.
    pub const TRACES_COUNTERS_FAILURES: &'static str =
        "coordinator_conflation_traces_failures_total";

    /// Initializes metrics for the conflation service.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    /// Describes metrics used in [`coordinator_conflation`][crate].
    #[cfg(feature = "metrics")]
    pub fn describe() {
        metrics::describe_counter!(
            Self::CONFLATED_BATCHES,
            metrics::Unit::Count,
            "Batches closed by the conflation service"
        );
        metrics::describe_gauge!(
            Self::PENDING_BLOCKS,
            metrics::Unit::Count,
            "Blocks buffered by the conflation service"
        );
        metrics::describe_counter!(
            Self::TRACES_COUNTERS_RETRIES,
            metrics::Unit::Count,
            "Traces counters requests retried after a transient error"
        );
        metrics::describe_counter!(
            Self::TRACES_COUNTERS_FAILURES,
            metrics::Unit::Count,
            "Blocks dropped after a non-retryable traces counters error"
        );
        metrics::describe_gauge!(
            Self::LAST_CONFLATED_BLOCK,
            "The last block of the last closed batch"
        );
    }

    /// Initializes metrics to `0` so they can be queried immediately by consumers of prometheus
    /// metrics.
    #[cfg(feature = "metrics")]
    pub fn zero() {
        use coordinator_domain::ConflationTrigger;

        for trigger in [
            ConflationTrigger::DataLimit,
            ConflationTrigger::TracesLimit,
            ConflationTrigger::BlocksLimit,
            ConflationTrigger::TimeLimit,
            ConflationTrigger::TargetBlockNumber,
        ] {
            metrics::counter!(Self::CONFLATED_BATCHES, "trigger" => trigger.to_string())
                .increment(0);
        }
        metrics::gauge!(Self::PENDING_BLOCKS).set(0);
        metrics::counter!(Self::TRACES_COUNTERS_RETRIES).increment(0);
        metrics::counter!(Self::TRACES_COUNTERS_FAILURES).increment(0);
    }
}
