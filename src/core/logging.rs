//! Process-wide logging on top of flexi_logger
//!
//! Every module logs through the `log` macros; this module installs the
//! backend once and keeps its handle alive for the life of the process.

use flexi_logger::{DeferredNow, FileSpec, Logger, LoggerHandle};
use log::Record;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::OnceLock;
use strum_macros::{Display, EnumString};

// Dropping the handle would flush and stop a file writer
static LOGGER_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

/// Output layout of log lines
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// Timestamp, level and message
    #[default]
    Text,
    /// Text plus the source location of the call
    Ext,
    /// One JSON object per line
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log specification '{spec}': {message}")]
    InvalidSpec { spec: String, message: String },

    #[error("Cannot log to '{path}': {message}")]
    File { path: String, message: String },

    #[error("Logger could not be started: {message}")]
    Start { message: String },
}

/// Install the global logger
///
/// `level` accepts any flexi_logger spec (`info`, `debug,gix=warn`, ...).
/// When `file` is given, output goes there instead of stderr.
pub fn init_logging(
    level: &str,
    format: LogFormat,
    file: Option<&str>,
    color_enabled: bool,
) -> Result<(), LoggingError> {
    let mut logger = Logger::try_with_str(level).map_err(|e| LoggingError::InvalidSpec {
        spec: level.to_string(),
        message: e.to_string(),
    })?;

    logger = match (format, color_enabled) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Ext, true) => logger.format(extended_color_format),
        (LogFormat::Ext, false) => logger.format(extended_format),
        (LogFormat::Text, true) => logger.format(simple_color_format),
        (LogFormat::Text, false) => logger.format(simple_format),
    };

    if let Some(path) = file {
        let file_spec =
            FileSpec::try_from(std::path::Path::new(path)).map_err(|e| LoggingError::File {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start().map_err(|e| LoggingError::Start {
        message: e.to_string(),
    })?;
    let _ = LOGGER_HANDLE.set(handle);
    Ok(())
}

fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn colored_level_tag(level: log::Level) -> colored::ColoredString {
    use colored::Colorize;

    match level {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    }
}

// "YYYY-MM-DD HH:mm:ss.fff INF message"
fn simple_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_tag(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        colored_level_tag(record.level()),
        record.args()
    )
}

// "YYYY-MM-DD HH:mm:ss.fff INF message (report/controller.rs:42)"
fn extended_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_tag(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        colored_level_tag(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let line = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_tag(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match serde_json::to_string(&line) {
        Ok(json) => w.write_all(json.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

/// `leakscan::scanner::fetcher` + line 7 -> `scanner/fetcher.rs:7`
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = match target.strip_prefix("leakscan::") {
        Some(module) => module.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };

    match line {
        Some(line) => format!("{}:{}", path_like, line),
        None => path_like,
    }
}
