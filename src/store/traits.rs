//! Store capability traits
//!
//! Each entity gets a small, fixed method set. Production backends and test
//! doubles implement the same traits and are injected into the controller.

use crate::model::{Report, Repository, Rule};
use crate::store::error::StoreResult;
use async_trait::async_trait;

/// Read access to registered repositories
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> StoreResult<Repository>;
}

/// Persistence for scan reports, keyed by report id
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> StoreResult<Report>;

    /// Most recently created report for a repository, if any
    async fn get_latest_by_repository_id(&self, repository_id: &str)
        -> StoreResult<Option<Report>>;

    async fn create(&self, report: &Report) -> StoreResult<Report>;

    /// Replace the stored report with the same id
    async fn update(&self, report: &Report) -> StoreResult<Report>;
}

/// Source of the active detection rules
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn get_all(&self) -> StoreResult<Vec<Rule>>;
}
