//! Metrics for the ingestion monitor.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the gauge tracking the next block number to fetch.
    pub const NEXT_BLOCK_TO_FETCH: &'static str = "coordinator_ingestion_next_block_to_fetch";

    /// Identifier for the counter of detected reorgs.
    pub const REORGS_DETECTED: &'static str = "coordinator_ingestion_reorgs_detected_total";

    /// Identifier for the counter of blocks rejected by the listener.
    pub const LISTENER_FAILURES: &'static str = "coordinator_ingestion_listener_failures_total";

    /// Initializes metrics for the ingestion monitor.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    /// Describes metrics used in [`coordinator_ingestion`][crate].
    #[cfg(feature = "metrics")]
    pub fn describe() {
        metrics::describe_gauge!(
            Self::NEXT_BLOCK_TO_FETCH,
            "The next block number the ingestion monitor fetches"
        );
        metrics::describe_counter!(
            Self::REORGS_DETECTED,
            metrics::Unit::Count,
            "Parent hash mismatches detected by the ingestion monitor"
        );
        metrics::describe_counter!(
            Self::LISTENER_FAILURES,
            metrics::Unit::Count,
            "Blocks rejected by the block creation listener"
        );
    }

    /// Initializes metrics to `0` so they can be queried immediately by consumers of prometheus
    /// metrics.
    #[cfg(feature = "metrics")]
    pub fn zero() {
        metrics::counter!(Self::REORGS_DETECTED).increment(0);
        metrics::counter!(Self::LISTENER_FAILURES).increment(0);
    }
}
