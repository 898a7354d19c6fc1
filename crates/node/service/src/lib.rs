#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod polling;
pub use polling::{PeriodicPollingService, PollingService};

mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

mod worker_pool;
pub use worker_pool::{WorkerPool, WorkerPoolError};

mod metrics;
pub use metrics::Metrics;
