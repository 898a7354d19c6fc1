#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod errors;
pub use errors::{
    AggregationError, AggregationsRepositoryError, L2StateError, ProofAggregationError,
};

mod traits;
pub use traits::{
    AggregationCalculator, AggregationL2StateProvider, AggregationsRepository,
    ProofAggregationClient, ProvenAggregationConsumer, ProvenAggregationConsumers,
};

pub mod calculators;

mod cursor;
pub use cursor::AggregationPollCursor;

mod config;
pub use config::ProofAggregationConfig;

mod coordinator;
pub use coordinator::ProofAggregationCoordinator;

mod metrics;
pub use metrics::Metrics;
