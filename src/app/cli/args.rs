//! Command line arguments
//!
//! Global flags override values from the configuration file; the
//! subcommand selects what the process does.

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "leakscan")]
#[command(about = "Scan remote git repositories for leaked secrets")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true,
          value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", global = true,
          value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<String>,

    /// Files scanned concurrently per repository
    #[arg(short = 'j', long = "concurrency", value_name = "COUNT", global = true)]
    pub concurrency: Option<usize>,

    /// Directory that holds per-repository scan workspaces
    #[arg(short = 'w', long = "workspace-root", value_name = "DIR", global = true)]
    pub workspace_root: Option<PathBuf>,

    /// Abort a repository fetch after this many seconds (0 disables)
    #[arg(short = 't', long = "fetch-timeout", value_name = "SECONDS", global = true)]
    pub fetch_timeout: Option<u64>,

    /// Force coloured log output
    #[arg(long = "color", conflicts_with = "no_color", global = true)]
    pub color: bool,

    /// Disable coloured log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a repository, scan it and print the report as JSON
    Scan {
        /// Display name for the repository
        name: String,
        /// Clone URL (https://, ssh://, file:// or a local path)
        remote_url: String,
    },
    /// List the active detection rules
    Rules {
        /// Validate every rule and fail if any is unusable
        #[arg(long)]
        check: bool,
    },
}

impl Args {
    /// Explicit flags win; otherwise colour follows whether stderr is a terminal
    pub fn use_color(&self) -> bool {
        if self.no_color {
            false
        } else if self.color {
            true
        } else {
            std::io::stderr().is_terminal()
        }
    }
}
