#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod calculator;
pub use calculator::{
    BlockConflationCalculator, ConflationCalculator, ConflationCalculatorError,
    ConflationCounters, DeferredTriggerConflationCalculator,
};

pub mod calculators;

mod global;
pub use global::GlobalBlockConflationCalculator;

mod config;
pub use config::ConflationConfig;

mod service;
pub use service::{
    BatchHandlerError, ConflatedBatchHandler, ConflationError, ConflationService,
    ConflationTriggerConsumer,
};

mod deadline_trigger;
pub use deadline_trigger::TimeDeadlineTrigger;

mod submission;
pub use submission::{
    BlockToBatchSubmissionCoordinator, TracesCountersClient, TracesCountersError,
    TracesCountersResponse,
};

mod metrics;
pub use metrics::Metrics;
