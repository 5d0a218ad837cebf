//! TOML configuration file parsing and loading
//!
//! Values come from three layers, each overriding the previous one: built-in
//! defaults, the configuration file, then command line flags.

use crate::app::cli::args::Args;
use crate::core::error_handling::ContextualError;
use crate::core::logging::LogFormat;
use crate::model::{builtin_rules, Rule};
use crate::scanner::api::DEFAULT_CONCURRENCY;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {path}")]
    MissingFile { path: String },

    #[error("Error reading configuration file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Error parsing configuration file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ConfigError::Invalid { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { message } => Some(message),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ScanSettings {
    pub concurrency: usize,
    pub workspace_root: PathBuf,
    pub fetch_timeout_secs: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            workspace_root: std::env::temp_dir().join("leakscan"),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scan: ScanSettings,
    pub logging: LoggingSettings,
    pub rules: Vec<Rule>,
}

impl Config {
    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Leakscan").join("leakscan.toml"))
    }

    /// Load configuration from `path`, or from the default location
    ///
    /// A file named explicitly must exist. A missing default file yields the
    /// built-in defaults.
    pub async fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingFile {
                        path: path.display().to_string(),
                    });
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.scan.concurrency == 0 {
            return Err(ConfigError::Invalid {
                message: "scan concurrency must be at least 1".to_string(),
            });
        }
        if self.scan.workspace_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                message: "scan workspace-root cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Apply command line flags on top of file values
    pub fn apply_overrides(&mut self, args: &Args) -> ConfigResult<()> {
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            self.logging.format = LogFormat::from_str(format).map_err(|_| ConfigError::Invalid {
                message: format!("unknown log format '{}'", format),
            })?;
        }
        if let Some(file) = &args.log_file {
            self.logging.file = Some(file.clone());
        }
        if let Some(concurrency) = args.concurrency {
            self.scan.concurrency = concurrency;
        }
        if let Some(root) = &args.workspace_root {
            self.scan.workspace_root = root.clone();
        }
        if let Some(secs) = args.fetch_timeout {
            self.scan.fetch_timeout_secs = secs;
        }
        self.validate()
    }

    /// Fetch ceiling, `None` when disabled
    pub fn fetch_timeout(&self) -> Option<Duration> {
        match self.scan.fetch_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Log file to write to; "none" and "-" mean stderr
    pub fn log_file(&self) -> Option<&str> {
        match self.logging.file.as_deref() {
            None | Some("none") | Some("-") | Some("") => None,
            Some(file) => Some(file),
        }
    }

    /// Configured rules, or the built-in set when none are configured
    ///
    /// Rules are validated where they are loaded into a rule store, so a
    /// broken pattern can still be listed by `rules --check`.
    pub fn active_rules(&self) -> Vec<Rule> {
        if self.rules.is_empty() {
            builtin_rules()
        } else {
            self.rules.clone()
        }
    }
}
