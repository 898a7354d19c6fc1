#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod errors;
pub use errors::{BlobsRepositoryError, ShnarfCalculatorError, ShnarfError};

mod traits;
pub use traits::{BlobShnarfCalculator, BlobsRepository, ShnarfInput};

mod rolling;
pub use rolling::{ParentBlob, RollingBlobShnarfCalculator, RollingBlobShnarfResult};

mod metrics;
pub use metrics::Metrics;
