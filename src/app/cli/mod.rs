//! CLI module containing argument parsing, configuration and display

pub mod args;
pub mod config;
pub mod display;

pub use args::{Args, Command};
pub use config::{Config, ConfigError, ConfigResult, LoggingSettings, ScanSettings};
