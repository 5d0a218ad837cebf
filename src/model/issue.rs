//! Issues produced by the detector
//!
//! Field names are part of the report wire format and must not change.

use serde::{Deserialize, Serialize};

/// Where in the repository a rule matched
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Path relative to the repository root
    pub path: String,
    /// 1-based line of the match start
    pub line: u64,
}

/// One confirmed occurrence of a rule pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub location: Location,
    pub description: String,
    pub severity: String,
    pub keyword: String,
}
