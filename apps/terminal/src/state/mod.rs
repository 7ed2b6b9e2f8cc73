//! # State Module
//!
//! Per-session state owned by the router.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Router                                     │   │
//! │  │  owns: Database, SettingsCache, Session, Box<dyn Prompt>       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │  lends per command                       │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Context { db, settings, session, prompt }                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │   Database   │  │ SettingsCache│  │     Session      │              │
//! │  │              │  │              │  │                  │              │
//! │  │  (SQLite     │  │  Arc<RwLock< │  │  id, view        │              │
//! │  │   pool)      │  │   Settings   │  │  cart            │              │
//! │  │              │  │  >>          │  │  last sale       │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  The session is touched by one command at a time (&mut borrow).         │
//! │  The settings cache is a cheap clonable handle.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;
mod settings;

pub use session::{Session, SessionOptions, View};
pub use settings::SettingsCache;
