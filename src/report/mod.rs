//! Report Lifecycle
//!
//! The controller that creates reports, runs their scans and records the
//! outcome, plus the keyed locks that keep two executions of the same report
//! from interleaving.

pub mod controller;
pub mod error;
pub mod locks;

pub use controller::{ReportController, ReportControllerBuilder};
pub use error::{ReportError, ReportResult};
pub use locks::{ReportLockGuard, ReportLocks};
