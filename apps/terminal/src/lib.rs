//! # Tally POS Terminal
//!
//! The operator-facing front end: a one-shot command line and an
//! interactive shell over the same set of commands.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Terminal                               │
//! │                                                                         │
//! │  main.rs ────► Cli::parse() ──► run()                                   │
//! │                                                                         │
//! │  run() ──────► config ──► logging ──► database ──► Router               │
//! │                                                      │                  │
//! │                      ┌───────────────────────────────┴─────────┐        │
//! │                      ▼                                         ▼        │
//! │              one command, exit                     Shell (REPL loop)    │
//! │                      │                                         │        │
//! │                      └──────────► router.dispatch ◄────────────┘        │
//! │                                        │                                │
//! │  commands/ ──► dashboard, products, customers, categories, pos,         │
//! │                receipts, reports, settings, data                        │
//! │                                        │                                │
//! │  state/ ─────► Session (view, cart, last sale), SettingsCache           │
//! └────────────────────────────────────────┼────────────────────────────────┘
//!                                          ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SQLite Database                                 │
//! │  tally.db (local file, WAL mode)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Load config (file, then `TALLY_*` variables, then `--db`)
//! 2. Initialize tracing on stderr
//! 3. Connect to the database and run migrations
//! 4. Seed defaults, load settings, start the session
//! 5. Run the command, or the shell when none was given

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompt;
pub mod router;
pub mod shell;
pub mod state;
pub mod view;

use std::io;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::AppConfig;
use error::ApiError;
use prompt::StdinPrompt;
use router::Router;
use shell::Shell;
use state::SessionOptions;
use tally_db::{Database, DbConfig};
use view::Tone;

/// Runs the terminal. Errors are printed, not returned.
pub async fn run(cli: Cli) -> ExitCode {
    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", view::alert(Tone::Danger, &err.message));
            ExitCode::FAILURE
        }
    }
}

async fn start(cli: Cli) -> Result<(), ApiError> {
    let mut config = AppConfig::load(cli.config.clone())?;
    if let Some(path) = cli.db.clone() {
        config.database.path = path;
    }

    init_tracing(&config.logging.filter);
    info!(db = %config.database.path.display(), "Starting Tally POS");

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = Database::new(
        DbConfig::new(config.database.path.clone())
            .max_connections(config.database.max_connections),
    )
    .await?;

    let mut router = Router::bootstrap(
        db,
        SessionOptions::from_config(&config),
        Box::new(StdinPrompt),
    )
    .await?;

    match cli.command {
        None | Some(Command::Shell) => {
            let lines = std::iter::from_fn(read_line);
            Shell::new(&mut router, lines, io::stdout()).run().await?;
        }
        Some(command) => {
            let output = router.dispatch(command, cli.yes).await?;
            println!("{}", output);
        }
    }

    router.database().close().await;
    Ok(())
}

/// One line of stdin, `None` at end of input.
fn read_line() -> Option<io::Result<String>> {
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(Ok(line)),
        Err(e) => Some(Err(e)),
    }
}

/// Initializes the tracing subscriber on stderr so command output stays
/// clean on stdout.
///
/// `RUST_LOG` wins over the configured filter.
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
