#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod execution;
pub use execution::AlloyExecutionClient;

mod traces;
pub use traces::{AlloyTracesCountersClient, TracesCountersRpcResponse};
