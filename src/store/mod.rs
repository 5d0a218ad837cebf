//! Persistence Boundary
//!
//! Capability traits for the repository, report and rule stores, plus
//! in-memory implementations.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryReportStore, MemoryRepositoryStore, MemoryRuleStore};
pub use traits::{ReportStore, RepositoryStore, RuleStore};
