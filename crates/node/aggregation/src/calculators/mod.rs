//! Aggregation boundary strategies.

mod proof_limit;
pub use proof_limit::AggregationCalculatorByProofLimit;
