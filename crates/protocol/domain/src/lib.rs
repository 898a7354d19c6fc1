#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod block;
pub use block::{Block, BlockCounters, BlockNumberAndHash};

mod traces;
pub use traces::{TracesCounters, TracingModule};

mod intervals;
pub use intervals::{BlockInterval, BlockIntervals, BlockIntervalsError};

mod conflation;
pub use conflation::{BlocksConflation, ConflationCalculationResult, ConflationTrigger};

mod blob;
pub use blob::{BlobCounters, BlobRecord, ShnarfResult};

mod aggregation;
pub use aggregation::{
    Aggregation, AggregationL2State, AggregationStatus, BlobAndBatchCounters, BlobsToAggregate,
    ExecutionProofVersions, ProofToFinalize, ProofsToAggregate, VersionedExecutionProofs,
};
