//! Metrics for the blob shnarf calculation.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the counter of parent blob lookups in the repository.
    pub const PARENT_BLOB_LOOKUPS: &'static str = "coordinator_shnarf_parent_blob_lookups_total";

    /// Identifier for the gauge tracking the last block of the last chained blob.
    pub const LAST_BLOB_END_BLOCK: &'static str = "coordinator_shnarf_last_blob_end_block";

    /// Initializes metrics for the shnarf calculation.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    /// Describes metrics used in [`coordinator_blob`][crate].
    #[cfg(feature = "metrics")]
    pub fn describe() {
        metrics::describe_counter!(
            Self::PARENT_BLOB_LOOKUPS,
            metrics::Unit::Count,
            "Parent blob lookups made on a cold shnarf cache"
        );
        metrics::describe_gauge!(
            Self::LAST_BLOB_END_BLOCK,
            "The last block of the last blob whose shnarf was computed"
        );
    }

    /// Initializes metrics to `0` so they can be queried immediately by consumers of prometheus
    /// metrics.
    #[cfg(feature = "metrics")]
    pub fn zero() {
        metrics::counter!(Self::PARENT_BLOB_LOOKUPS).increment(0);
    }
}
