//! Task Queue Component
//!
//! Carries scan jobs from the report controller to whatever runs them.
//!
//! ```text
//! ┌──────────────────┐ enqueue(report_id) ┌────────────────┐ recv ┌─────────────┐
//! │ ReportController │ ─────────────────▶ │ LocalTaskQueue │ ───▶ │ JobConsumer │
//! └──────────────────┘                    └────────────────┘      └──────┬──────┘
//!          ▲                                                             │
//!          └──────────────────── JobHandler::handle(ScanJob) ────────────┘
//! ```
//!
//! The producer side is the `TaskQueue` trait so a broker-backed queue can
//! replace the in-process channel without touching the controller. Delivery
//! is at-most-once in process; handlers must still tolerate a job for the
//! same report arriving twice.

pub mod api;
pub mod consumer;
pub mod error;
pub mod message;
pub mod task_queue;

pub use consumer::{JobConsumer, JobHandler};
pub use error::{QueueError, QueueResult};
pub use message::{Message, MessageHeader, ScanJob, SCAN_JOB_TYPE};
pub use task_queue::{JobReceiver, LocalTaskQueue, TaskQueue};
