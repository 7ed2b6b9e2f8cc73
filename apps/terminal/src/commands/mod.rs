//! # Feature Modules
//!
//! One module per screen of the point of sale. Every entry point has the
//! same shape:
//!
//! ```rust,ignore
//! pub async fn handle(ctx: &mut Context<'_>, command: XCommand) -> Result<String, ApiError>
//! ```
//!
//! ## Module Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (Context)
//! ├── dashboard.rs   ◄─── Today's numbers, recent sales, low stock
//! ├── products.rs    ◄─── Product CRUD, search, stock adjustment
//! ├── customers.rs   ◄─── Customer CRUD, sales history
//! ├── categories.rs  ◄─── Category CRUD
//! ├── pos.rs         ◄─── Cart and checkout
//! ├── receipts.rs    ◄─── Template catalog, show / print / save
//! ├── reports.rs     ◄─── Stats, sales, inventory, customers, tax, CSV
//! ├── settings.rs    ◄─── Store, tax, receipt and general settings, theme
//! └── data.rs        ◄─── Export, import, backup, restore, clear
//! ```
//!
//! ## Handler Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  router.dispatch(Command::Products(List { search }))                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  products::handle(&mut ctx, cmd)                                        │
//! │         │  ctx.db.products().list_all().await?     ◄── read the store   │
//! │         │  search(&products, query, FIELDS)        ◄── tally-core       │
//! │         ▼                                                               │
//! │  view::table(...)                                  ◄── render           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Ok(String) ──► printed by main / the shell                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use tally_core::format::{format_date, DateStyle};
use tally_db::Database;

use crate::prompt::Prompt;
use crate::state::{Session, SettingsCache};
use crate::view::{self, Tone};

pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod data;
pub mod pos;
pub mod products;
pub mod receipts;
pub mod reports;
pub mod settings;

/// What a handler may touch for the duration of one command.
pub struct Context<'a> {
    pub db: &'a Database,
    pub settings: &'a SettingsCache,
    pub session: &'a mut Session,
    pub prompt: &'a mut dyn Prompt,
}

impl Context<'_> {
    /// Asks before a destructive operation, unless the session skips confirmations.
    pub fn confirm(&mut self, question: &str) -> bool {
        if !self.session.options.confirm_destructive {
            return true;
        }
        self.prompt.confirm(question)
    }

    /// `--dir` when given, otherwise the configured export dir.
    pub fn output_dir(&self, dir: Option<PathBuf>) -> PathBuf {
        dir.unwrap_or_else(|| self.session.options.export_dir.clone())
    }
}

/// Shown when the operator answers no.
pub(crate) fn cancelled() -> String {
    view::alert(Tone::Info, "Cancelled")
}

/// A stored timestamp in the operator's local time.
pub(crate) fn local_date(date: &DateTime<Utc>, style: DateStyle) -> String {
    format_date(&date.with_timezone(&Local), style)
}

/// Writes `contents` to `dir/name`, creating `dir` first.
pub(crate) fn write_file(dir: &Path, name: &str, contents: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}
