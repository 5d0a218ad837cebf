//! Domain Model
//!
//! Rules, repositories, reports and issues. The serialized field names of
//! `Report` and `Issue` are the contract consumed by API clients.

pub mod issue;
pub mod report;
pub mod repository;
pub mod rule;

pub use issue::{Issue, Location};
pub use report::{Report, ReportStatus, TransitionError};
pub use repository::Repository;
pub use rule::{builtin_rules, formatted_id, validate_rules, Rule, RuleError, Severity};
