//! Scanner Component
//!
//! The scan pipeline for one job: a `Fetcher` materialises the repository
//! into a `Workspace`, the extension denylist and content classifier drop
//! binaries, and the `ScanOrchestrator` runs the keyword prefilter and the
//! regex `Detector` over the remaining files on a bounded worker pool.
//!
//! ## Core Features
//!
//! - **Fetcher**: full clone and checkout via gix, optional wall-clock ceiling
//! - **Workspace**: scan-exclusive directory removed on every exit path
//! - **Prefilter**: one case-insensitive Aho-Corasick automaton per scan run
//! - **Detector**: all non-overlapping matches, located by 1-based line
//! - **Orchestrator**: bounded concurrency with fail-fast cancellation

pub mod api;
pub mod classifier;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod orchestrator;
pub mod prefilter;
pub mod ruleset;
pub mod workspace;

pub use error::{ScanError, ScanResult};
