//! # Tally POS Entry Point
//!
//! `tally` with no arguments opens the shell; `tally <command>` runs one
//! command and exits. The actual setup is in lib.rs for testability.

use std::process::ExitCode;

use clap::Parser;

use tally_terminal::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    tally_terminal::run(Cli::parse()).await
}
