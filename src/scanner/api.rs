//! Scanner API
//!
//! Public surface of the scanner, consolidated so the report controller and
//! the binary do not reach into individual scanner modules.

// Pipeline stages
pub use crate::scanner::fetcher::{Fetcher, GitFetcher};
pub use crate::scanner::orchestrator::{ScanOrchestrator, DEFAULT_CONCURRENCY};
pub use crate::scanner::ruleset::CompiledRuleSet;
pub use crate::scanner::workspace::Workspace;

// Building blocks
pub use crate::scanner::classifier::is_probably_text;
pub use crate::scanner::detector::{CompiledRule, Detector, Fragment};
pub use crate::scanner::filter::is_denylisted;
pub use crate::scanner::prefilter::PrefilterIndex;

// Error handling
pub use crate::scanner::error::{ScanError, ScanResult};
