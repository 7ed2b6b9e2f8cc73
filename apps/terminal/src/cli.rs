//! # Command Line
//!
//! clap definitions for one-shot commands and shell lines. Both parse into
//! the same [`Command`] tree, so the router has a single entry point.
//!
//! ```text
//! tally [--config FILE] [--db FILE] [--yes] <route> <operation> [args]
//!
//! tally products list --search tea
//! tally pos checkout cash           (cart only lives inside `tally shell`)
//! tally reports export sales --range week
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tally_core::export::ExportFormat;
use tally_core::report::ReportKind;
use tally_core::{DataKind, DateRange, Money, PaymentMethod, Quantity, ReceiptTemplate, TaxRate, Theme};

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Offline-first point of sale")]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config and TALLY_DB_PATH
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Starts the interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One line typed into the shell.
#[derive(Debug, Parser)]
#[command(name = "tally", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    /// Answer yes to this command's confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Today's sales, counts, recent sales and low stock
    Dashboard,

    /// Product catalog and stock
    #[command(subcommand)]
    Products(ProductCommand),

    /// Customer records
    #[command(subcommand)]
    Customers(CustomerCommand),

    /// Product categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Cart and checkout
    #[command(subcommand)]
    Pos(PosCommand),

    /// Receipt templates and printing
    #[command(subcommand)]
    Receipt(ReceiptCommand),

    /// Sales, inventory, customer and tax reports
    #[command(subcommand)]
    Reports(ReportCommand),

    /// Store settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Export, import, backup, restore and clear
    #[command(subcommand)]
    Data(DataCommand),

    /// Toggle light/dark theme
    Theme,

    /// Interactive session that keeps the cart between commands
    Shell,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum ProductCommand {
    List {
        /// Matches name, SKU, barcode and description
        #[arg(long)]
        search: Option<String>,
        /// Category id
        #[arg(long)]
        category: Option<i64>,
    },
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = Money::parse)]
        price: Money,
        #[command(flatten)]
        fields: ProductFields,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = Money::parse)]
        price: Option<Money>,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: i64,
    },
    /// Add or remove stock by a signed amount
    AdjustStock {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        amount: Quantity,
        #[arg(long)]
        reason: Option<String>,
    },
}

/// Optional product fields shared by `add` and `edit`.
#[derive(Debug, Clone, PartialEq, Default, Args)]
pub struct ProductFields {
    /// Generated when omitted on add
    #[arg(long)]
    pub sku: Option<String>,
    #[arg(long)]
    pub barcode: Option<String>,
    /// Category id
    #[arg(long)]
    pub category: Option<i64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = Money::parse)]
    pub cost: Option<Money>,
    #[arg(long)]
    pub stock: Option<Quantity>,
    /// pcs, kg, m, ...
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long)]
    pub low_stock: Option<Quantity>,
    /// Percent, e.g. 18 or 8.25
    #[arg(long)]
    pub tax: Option<TaxRate>,
}

// =============================================================================
// Customers & Categories
// =============================================================================

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum CustomerCommand {
    List {
        /// Matches name, phone and email
        #[arg(long)]
        search: Option<String>,
    },
    /// Details with sales history
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[command(flatten)]
        fields: CustomerFields,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[command(flatten)]
        fields: CustomerFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Args)]
pub struct CustomerFields {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum CategoryCommand {
    List,
    Add { name: String },
    Rename { id: i64, name: String },
    Delete { id: i64 },
}

// =============================================================================
// POS & Receipts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum PosCommand {
    /// Product picker
    Browse {
        /// Matches name, SKU and barcode
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<i64>,
    },
    /// Add one unit of a product
    Add {
        product: i64,
    },
    /// Set a line's quantity; 0 removes it
    Qty {
        /// Line number as shown by `pos cart`
        line: usize,
        qty: Quantity,
    },
    Remove {
        line: usize,
    },
    Cart,
    /// Attach a customer to the sale
    Customer {
        id: Option<i64>,
        /// Back to walk-in
        #[arg(long, conflicts_with = "id")]
        none: bool,
    },
    Clear,
    Checkout {
        /// cash, card, upi or other
        payment: PaymentMethod,
    },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum ReceiptCommand {
    /// The built-in templates
    Templates,
    /// HTML fragment
    Show {
        /// Defaults to the last sale of this session
        sale: Option<i64>,
        #[arg(long)]
        template: Option<ReceiptTemplate>,
    },
    /// Standalone printable document on stdout
    Print {
        sale: Option<i64>,
        #[arg(long)]
        template: Option<ReceiptTemplate>,
    },
    /// Standalone document written to `receipt_{id}_{date}.html`
    Save {
        sale: Option<i64>,
        #[arg(long)]
        template: Option<ReceiptTemplate>,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum ReportCommand {
    /// Revenue, transactions, items sold, average sale
    Summary {
        #[arg(long, default_value = "today")]
        range: DateRange,
    },
    Sales {
        #[arg(long, default_value = "today")]
        range: DateRange,
    },
    Inventory,
    Customers,
    Tax {
        #[arg(long, default_value = "today")]
        range: DateRange,
    },
    /// Write a report as CSV
    Export {
        /// sales, inventory, customers or tax
        kind: ReportKind,
        #[arg(long, default_value = "today")]
        range: DateRange,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

// =============================================================================
// Settings & Data
// =============================================================================

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum SettingsCommand {
    Show,
    /// Store name and contact details
    Store {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        logo: Option<String>,
    },
    Tax {
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        name: Option<String>,
        /// Percent
        #[arg(long)]
        rate: Option<TaxRate>,
    },
    Receipt {
        #[arg(long)]
        header: Option<String>,
        #[arg(long)]
        footer: Option<String>,
        /// Default template key
        #[arg(long)]
        template: Option<ReceiptTemplate>,
    },
    General {
        #[arg(long)]
        currency_symbol: Option<String>,
        #[arg(long)]
        currency_code: Option<String>,
        #[arg(long)]
        decimal_places: Option<u8>,
        /// Global threshold for the dashboard's low-stock list
        #[arg(long)]
        low_stock: Option<Quantity>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        theme: Option<Theme>,
    },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum DataCommand {
    /// Write one collection to `{entity}_{date}.{ext}`
    Export {
        /// products, customers, sales or categories
        entity: DataKind,
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Bulk insert records from a JSON or CSV file
    Import {
        entity: DataKind,
        file: PathBuf,
    },
    /// Write a full backup to `pos_backup_{date}.json`
    Backup {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Replace all data with a backup
    Restore {
        file: PathBuf,
    },
    /// Delete all products, customers, sales and categories
    Clear,
}
