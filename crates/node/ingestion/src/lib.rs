#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod traits;
pub use traits::{BlockCreationListener, ExecutionClient, LastProvenBlockNumberProvider};

mod errors;
pub use errors::{BlockCreationListenerError, BlockCreationMonitorError, ClientError};

mod last_proven;
pub use last_proven::LastProvenBlock;

mod monitor;
pub use monitor::{BlockCreated, BlockCreationMonitor, BlockCreationMonitorConfig};

mod metrics;
pub use metrics::Metrics;
