use clap::Parser;
use leakscan::app::cli::Args;
use leakscan::app::startup;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    startup::run(Args::parse()).await
}
