//! In-memory store implementations
//!
//! Used by the command line front end and by tests. Each store guards its
//! records with a `RwLock`; an update replaces the whole record under the
//! write lock so readers never observe a half-applied transition.

use crate::model::{validate_rules, Report, Repository, Rule};
use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::{ReportStore, RepositoryStore, RuleStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Backend {
        message: "store lock poisoned".to_string(),
    }
}

/// Repository records held in memory
#[derive(Debug, Default)]
pub struct MemoryRepositoryStore {
    repositories: RwLock<HashMap<String, Repository>>,
}

impl MemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new repository under a generated id
    pub fn add(&self, name: &str, remote_url: &str) -> StoreResult<Repository> {
        let repository = Repository::new(name, remote_url);
        self.insert(repository.clone())?;
        Ok(repository)
    }

    pub fn insert(&self, repository: Repository) -> StoreResult<()> {
        let mut repositories = self.repositories.write().map_err(poisoned)?;
        if repositories.contains_key(&repository.id) {
            return Err(StoreError::AlreadyExists {
                entity: "repository",
                id: repository.id,
            });
        }
        repositories.insert(repository.id.clone(), repository);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.repositories.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RepositoryStore for MemoryRepositoryStore {
    async fn get_by_id(&self, id: &str) -> StoreResult<Repository> {
        self.repositories
            .read()
            .map_err(poisoned)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("repository", id))
    }
}

#[derive(Debug)]
struct StoredReport {
    /// Insertion order, breaks ties between equal creation times
    sequence: u64,
    report: Report,
}

#[derive(Debug, Default)]
struct ReportTable {
    next_sequence: u64,
    reports: HashMap<String, StoredReport>,
}

/// Report records held in memory
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    table: RwLock<ReportTable>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All reports for a repository, oldest first
    pub fn list_by_repository_id(&self, repository_id: &str) -> StoreResult<Vec<Report>> {
        let table = self.table.read().map_err(poisoned)?;
        let mut stored: Vec<&StoredReport> = table
            .reports
            .values()
            .filter(|s| s.report.repository_id == repository_id)
            .collect();
        stored.sort_by_key(|s| (s.report.created_at, s.sequence));
        Ok(stored.into_iter().map(|s| s.report.clone()).collect())
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn get_by_id(&self, id: &str) -> StoreResult<Report> {
        self.table
            .read()
            .map_err(poisoned)?
            .reports
            .get(id)
            .map(|s| s.report.clone())
            .ok_or_else(|| StoreError::not_found("report", id))
    }

    async fn get_latest_by_repository_id(
        &self,
        repository_id: &str,
    ) -> StoreResult<Option<Report>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .reports
            .values()
            .filter(|s| s.report.repository_id == repository_id)
            .max_by_key(|s| (s.report.created_at, s.sequence))
            .map(|s| s.report.clone()))
    }

    async fn create(&self, report: &Report) -> StoreResult<Report> {
        let mut table = self.table.write().map_err(poisoned)?;
        if table.reports.contains_key(&report.id) {
            return Err(StoreError::AlreadyExists {
                entity: "report",
                id: report.id.clone(),
            });
        }
        let sequence = table.next_sequence;
        table.next_sequence += 1;
        table.reports.insert(
            report.id.clone(),
            StoredReport {
                sequence,
                report: report.clone(),
            },
        );
        Ok(report.clone())
    }

    async fn update(&self, report: &Report) -> StoreResult<Report> {
        let mut table = self.table.write().map_err(poisoned)?;
        let stored = table
            .reports
            .get_mut(&report.id)
            .ok_or_else(|| StoreError::not_found("report", report.id.clone()))?;
        stored.report = report.clone();
        Ok(report.clone())
    }
}

/// A fixed rule set, validated when the store is built
#[derive(Debug)]
pub struct MemoryRuleStore {
    rules: Vec<Rule>,
}

impl MemoryRuleStore {
    pub fn new(rules: Vec<Rule>) -> StoreResult<Self> {
        validate_rules(&rules)?;
        Ok(Self { rules })
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn get_all(&self) -> StoreResult<Vec<Rule>> {
        Ok(self.rules.clone())
    }
}
