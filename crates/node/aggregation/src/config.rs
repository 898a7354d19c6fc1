//! Proof aggregation configuration.

use crate::calculators::AggregationCalculatorByProofLimit;
use std::time::Duration;

/// Configuration of the [`ProofAggregationCoordinator`](crate::ProofAggregationCoordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofAggregationConfig {
    /// The interval between two ticks.
    pub polling_interval: Duration,
    /// The version recorded on every persisted aggregation.
    pub aggregation_calculator_version: String,
    /// The maximum number of proofs per aggregation.
    pub proofs_limit: u32,
    /// How long an aggregation may stay open, measured from its first block timestamp.
    pub aggregation_deadline: Option<Duration>,
}

impl Default for ProofAggregationConfig {
    fn default() -> Self {
        Self {
            polling_interval: Duration::from_secs(10),
            aggregation_calculator_version: "0.1.0".to_string(),
            proofs_limit: 300,
            aggregation_deadline: None,
        }
    }
}

impl ProofAggregationConfig {
    /// Builds the calculator enforcing the configured limits.
    pub fn build_calculator(&self) -> AggregationCalculatorByProofLimit {
        let calculator = AggregationCalculatorByProofLimit::new(self.proofs_limit);
        match self.aggregation_deadline {
            Some(deadline) => calculator.with_deadline(deadline),
            None => calculator,
        }
    }
}
