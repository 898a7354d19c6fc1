//! Metrics for the polling runtime.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the counter of failed polling ticks, labelled by service.
    pub const POLLING_TICK_ERRORS: &'static str = "coordinator_polling_tick_errors_total";

    /// Identifier for the gauge of busy worker pool permits.
    pub const WORKER_POOL_BUSY: &'static str = "coordinator_worker_pool_busy";

    /// Initializes metrics for the polling runtime.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    /// Describes metrics used in [`coordinator_service`][crate].
    #[cfg(feature = "metrics")]
    pub fn describe() {
        metrics::describe_counter!(
            Self::POLLING_TICK_ERRORS,
            metrics::Unit::Count,
            "Polling service ticks that ended with an error"
        );
        metrics::describe_gauge!(
            Self::WORKER_POOL_BUSY,
            metrics::Unit::Count,
            "Worker pool permits currently held"
        );
    }

    /// Initializes metrics to `0` so they can be queried immediately by consumers of prometheus
    /// metrics.
    #[cfg(feature = "metrics")]
    pub fn zero() {
        metrics::gauge!(Self::WORKER_POOL_BUSY).set(0);
    }
}
