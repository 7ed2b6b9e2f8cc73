//! # Command Router
//!
//! Owns everything that outlives a single command: the database handle,
//! the settings cache, the session (view, cart, last sale) and the prompt.
//! Each dispatch lends them to one handler through a [`Context`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Router                                        │
//! │                                                                         │
//! │   Database ─────┐                                                       │
//! │   SettingsCache ┤                                                       │
//! │   Session ──────┼──► Context<'_> ──► commands::<screen>::handle          │
//! │   Prompt ───────┘        ▲                                              │
//! │                          │                                              │
//! │              AutoConfirm(true) when --yes                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use tally_db::Database;

use crate::cli::Command;
use crate::commands::{self, Context};
use crate::error::ApiError;
use crate::prompt::{AutoConfirm, Prompt};
use crate::state::{Session, SessionOptions, SettingsCache, View};

pub struct Router {
    db: Database,
    settings: SettingsCache,
    session: Session,
    prompt: Box<dyn Prompt>,
}

impl Router {
    /// Seeds a fresh store and loads the settings into the cache.
    pub async fn bootstrap(
        db: Database,
        options: SessionOptions,
        prompt: Box<dyn Prompt>,
    ) -> Result<Self, ApiError> {
        db.seed_defaults().await?;
        let settings = db.settings().ensure_defaults().await?;

        let session = Session::new(options);
        info!(session = %session.id, store = %settings.store_name, "Session started");

        Ok(Router {
            db,
            settings: SettingsCache::new(settings),
            session,
            prompt,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Runs one command. `assume_yes` answers every confirmation it asks.
    pub async fn dispatch(&mut self, command: Command, assume_yes: bool) -> Result<String, ApiError> {
        if let Some(view) = view_of(&command) {
            self.session.view = view;
        }
        debug!(session = %self.session.id, view = %self.session.view, "dispatch");

        let mut yes = AutoConfirm(true);
        let prompt: &mut dyn Prompt = if assume_yes {
            &mut yes
        } else {
            self.prompt.as_mut()
        };
        let mut ctx = Context {
            db: &self.db,
            settings: &self.settings,
            session: &mut self.session,
            prompt,
        };

        match command {
            Command::Dashboard => commands::dashboard::handle(&mut ctx).await,
            Command::Products(cmd) => commands::products::handle(&mut ctx, cmd).await,
            Command::Customers(cmd) => commands::customers::handle(&mut ctx, cmd).await,
            Command::Categories(cmd) => commands::categories::handle(&mut ctx, cmd).await,
            Command::Pos(cmd) => commands::pos::handle(&mut ctx, cmd).await,
            Command::Receipt(cmd) => commands::receipts::handle(&mut ctx, cmd).await,
            Command::Reports(cmd) => commands::reports::handle(&mut ctx, cmd).await,
            Command::Settings(cmd) => commands::settings::handle(&mut ctx, cmd).await,
            Command::Data(cmd) => commands::data::handle(&mut ctx, cmd).await,
            Command::Theme => commands::settings::toggle_theme(&mut ctx).await,
            Command::Shell => Err(ApiError::validation("Already in the shell")),
        }
    }
}

/// The screen a command belongs to. `theme` keeps the current one.
fn view_of(command: &Command) -> Option<View> {
    let view = match command {
        Command::Dashboard => View::Dashboard,
        Command::Products(_) => View::Products,
        Command::Customers(_) => View::Customers,
        Command::Categories(_) => View::Categories,
        Command::Pos(_) => View::Pos,
        Command::Receipt(_) => View::Receipts,
        Command::Reports(_) => View::Reports,
        Command::Settings(_) => View::Settings,
        Command::Data(_) => View::Data,
        Command::Theme | Command::Shell => return None,
    };
    Some(view)
}
