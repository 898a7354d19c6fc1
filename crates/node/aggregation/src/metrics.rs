//! Metrics for the proof aggregation coordinator.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the counter of proven aggregations.
    pub const PROVEN_AGGREGATIONS: &'static str = "coordinator_aggregation_proven_total";

    /// Identifier for the counter of failed aggregations.
    pub const FAILED_AGGREGATIONS: &'static str = "coordinator_aggregation_failed_total";

    /// Identifier for the gauge tracking the last block of the last proven aggregation.
    pub const LAST_PROVEN_BLOCK: &'static str = "coordinator_aggregation_last_proven_block";

    /// Initializes metrics for the proof aggregation coordinator.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    /// Describes metrics used in [`coordinator_aggregation`][crate].
    #[cfg(feature = "metrics")]
    pub fn describe() {
        metrics::describe_counter!(
            Self::PROVEN_AGGREGATIONS,
            metrics::Unit::Count,
            "Aggregations proven and persisted"
        );
        metrics::describe_counter!(
            Self::FAILED_AGGREGATIONS,
            metrics::Unit::Count,
            "Aggregations whose proof request or persistence failed"
        );
        metrics::describe_gauge!(
            Self::LAST_PROVEN_BLOCK,
            "The last block of the last proven aggregation"
        );
    }

    /// Initializes metrics to `0` so they can be queried immediately by consumers of prometheus
    /// metrics.
    #[cfg(feature = "metrics")]
    pub fn zero() {
        metrics::counter!(Self::PROVEN_AGGREGATIONS).increment(0);
        metrics::counter!(Self::FAILED_AGGREGATIONS).increment(0);
    }
}
