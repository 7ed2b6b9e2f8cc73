//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Feature module                                                        │
//! │       │                                                                 │
//! │       │  ctx.db.sales().commit(&sale)                                  │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── commit(&self, sale)          ← one transaction                    │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_all(&self)                                                   │
//! │  └── list_by_customer(&self, id)  ← secondary index                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row-level insert helpers take a `&mut SqliteConnection` so the same SQL runs
//! on a pooled connection or inside a transaction (bulk import, restore).
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, stock adjustment
//! - [`customer::CustomerRepository`] - Customer CRUD
//! - [`category::CategoryRepository`] - Category CRUD and default seeding
//! - [`sale::SaleRepository`] - Checkout commit and sale history
//! - [`settings::SettingsRepository`] - The `appSettings` record
//! - [`receipt_template::ReceiptTemplateRepository`] - Template catalog
//! - [`backup::BackupRepository`] - Snapshot, restore, clear-all

pub mod backup;
pub mod category;
pub mod customer;
pub mod product;
pub mod receipt_template;
pub mod sale;
pub mod settings;
