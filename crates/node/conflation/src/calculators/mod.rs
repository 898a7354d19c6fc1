//! Batch boundary strategies.

mod block_limit;
pub use block_limit::ConflationCalculatorByBlockLimit;

mod data_size;
pub use data_size::ConflationCalculatorByDataSize;

mod traces;
pub use traces::ConflationCalculatorByExecutionTraces;

mod target_block_numbers;
pub use target_block_numbers::ConflationCalculatorByTargetBlockNumbers;

mod time_deadline;
pub use time_deadline::{ConflationCalculatorByTimeDeadline, TimeDeadlineConfig};
