//! Application startup
//!
//! Loads configuration, starts logging, then runs the selected subcommand
//! under the shutdown coordinator.

use crate::app::cli::args::{Args, Command};
use crate::app::cli::config::Config;
use crate::app::cli::display::{check_rules, render_rule_table};
use crate::core::error_handling::{describe, log_error_with_context};
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version::long_version;
use crate::model::{Report, ReportStatus};
use crate::queue::api::{JobConsumer, JobReceiver, LocalTaskQueue};
use crate::report::{ReportController, ReportError, ReportResult};
use crate::scanner::api::{GitFetcher, ScanOrchestrator};
use crate::store::{MemoryReportStore, MemoryRepositoryStore, MemoryRuleStore, ReportStore};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Producer id stamped on jobs published by this process
const PRODUCER_ID: &str = "leakscan-cli";

/// Run the application for parsed command line arguments
pub async fn run(args: Args) -> ExitCode {
    let mut config = match Config::load(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", describe(&e, "Loading configuration"));
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.apply_overrides(&args) {
        eprintln!("Error: {}", describe(&e, "Applying command line options"));
        return ExitCode::FAILURE;
    }

    let use_color = args.use_color();
    if let Err(e) = init_logging(
        &config.logging.level,
        config.logging.format,
        config.log_file(),
        use_color,
    ) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    log::debug!("leakscan {} starting", long_version());

    ShutdownCoordinator::guard(|shutdown| async move {
        match args.command {
            Command::Scan { name, remote_url } => {
                match scan_repository(&config, &name, &remote_url, shutdown).await {
                    Ok(Some(report)) => exit_code(print_report(&report)),
                    Ok(None) => {
                        log::warn!("Interrupted before the scan started");
                        ExitCode::FAILURE
                    }
                    Err(e) => {
                        log_error_with_context(&e, "Scanning repository");
                        ExitCode::FAILURE
                    }
                }
            }
            Command::Rules { check } => exit_code(list_rules(&config, check, use_color)),
        }
    })
    .await
}

/// Controller wired to in-memory stores and a local queue
pub struct LocalPipeline {
    pub controller: Arc<ReportController>,
    pub repositories: Arc<MemoryRepositoryStore>,
    pub reports: Arc<MemoryReportStore>,
    pub receiver: JobReceiver,
}

impl LocalPipeline {
    pub fn new(config: &Config) -> ReportResult<Self> {
        let repositories = Arc::new(MemoryRepositoryStore::new());
        let reports = Arc::new(MemoryReportStore::new());
        let rules = Arc::new(MemoryRuleStore::new(config.active_rules())?);
        let (queue, receiver) = LocalTaskQueue::new(PRODUCER_ID);

        let fetcher = match config.fetch_timeout() {
            Some(timeout) => GitFetcher::new().with_timeout(timeout),
            None => GitFetcher::new(),
        };

        let controller = ReportController::builder(
            repositories.clone(),
            reports.clone(),
            rules,
            Arc::new(queue),
        )
        .with_fetcher(Arc::new(fetcher))
        .with_orchestrator(ScanOrchestrator::new(config.scan.concurrency))
        .with_workspace_root(config.scan.workspace_root.clone())
        .build();

        Ok(Self {
            controller: Arc::new(controller),
            repositories,
            reports,
            receiver,
        })
    }
}

/// Register a repository, queue a report for it and run the job
///
/// Returns `None` when shutdown arrives before the job is picked up.
pub async fn scan_repository(
    config: &Config,
    name: &str,
    remote_url: &str,
    mut shutdown: broadcast::Receiver<()>,
) -> ReportResult<Option<Report>> {
    let pipeline = LocalPipeline::new(config)?;
    let repository = pipeline.repositories.add(name, remote_url)?;
    log::info!("Registered repository {} as {}", name, repository.id);

    let report = pipeline.controller.create_report(&repository.id).await?;

    let mut consumer = JobConsumer::new(pipeline.receiver, Arc::clone(&pipeline.controller));
    if !consumer.process_next(&mut shutdown).await {
        return Ok(None);
    }

    finished_report(pipeline.reports.as_ref(), &report.id)
        .await
        .map(Some)
}

/// The stored report, which must be terminal once its job has run
async fn finished_report(reports: &dyn ReportStore, report_id: &str) -> ReportResult<Report> {
    let report = reports.get_by_id(report_id).await?;
    if !report.is_terminal() {
        return Err(ReportError::Unfinished {
            id: report.id,
            status: report.status,
        });
    }
    Ok(report)
}

fn exit_code(succeeded: bool) -> ExitCode {
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print the report as JSON; true when the scan succeeded
fn print_report(report: &Report) -> bool {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("FATAL: cannot render report {}: {}", report.id, e);
            return false;
        }
    }
    report.status == ReportStatus::Success
}

/// Print the rule table; with `check`, false when any rule is unusable
fn list_rules(config: &Config, check: bool, use_color: bool) -> bool {
    let rules = config.active_rules();
    if !check {
        print!("{}", render_rule_table(&rules, None, use_color));
        return true;
    }

    let checks = check_rules(&rules);
    print!("{}", render_rule_table(&rules, Some(&checks), use_color));
    let failures = checks.iter().filter(|c| c.problem.is_some()).count();
    if failures > 0 {
        log::error!("{} of {} rules failed validation", failures, rules.len());
        return false;
    }
    true
}
