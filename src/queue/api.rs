//! Queue API
//!
//! Public surface of the task queue for the controller, binary and tests.

// Producer side
pub use crate::queue::task_queue::{JobReceiver, LocalTaskQueue, TaskQueue};

// Consumer side
pub use crate::queue::consumer::{JobConsumer, JobHandler};

// Messages
pub use crate::queue::message::{Message, MessageHeader, ScanJob, SCAN_JOB_TYPE};

// Error handling
pub use crate::queue::error::{QueueError, QueueResult};
