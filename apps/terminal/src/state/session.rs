//! # Session State
//!
//! Everything that lives between two commands of the same shell session.
//! A one-shot command gets a fresh session and drops it on exit, so the
//! cart only survives inside `tally shell`.

use std::fmt;
use std::path::PathBuf;

use tally_core::Cart;
use uuid::Uuid;

use crate::config::AppConfig;

/// The feature module the operator is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Products,
    Customers,
    Categories,
    Pos,
    Receipts,
    Reports,
    Settings,
    Data,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Products => "products",
            View::Customers => "customers",
            View::Categories => "categories",
            View::Pos => "pos",
            View::Receipts => "receipt",
            View::Reports => "reports",
            View::Settings => "settings",
            View::Data => "data",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session behavior taken from the `[session]` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub confirm_destructive: bool,
    pub export_dir: PathBuf,
}

impl SessionOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        SessionOptions {
            confirm_destructive: config.session.confirm_destructive,
            export_dir: config.session.export_dir.clone(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    /// Tags every log line of this session.
    pub id: Uuid,
    pub view: View,
    /// Holds the selected customer too.
    pub cart: Cart,
    /// Id of the last sale checked out in this session.
    pub last_sale: Option<i64>,
    pub options: SessionOptions,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Session {
            id: Uuid::new_v4(),
            view: View::default(),
            cart: Cart::new(),
            last_sale: None,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_on_dashboard() {
        let session = Session::new(SessionOptions::default());
        assert_eq!(session.view, View::Dashboard);
        assert!(session.cart.is_empty());
        assert!(session.last_sale.is_none());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let a = Session::new(SessionOptions::default());
        let b = Session::new(SessionOptions::default());
        assert_ne!(a.id, b.id);
    }
}
