//! # Seed Data Generator
//!
//! Populates the database with demo products and customers for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p tally-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tally-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Products
//! Products are filed under the default categories, each with:
//! - SKU: `{CODE}-{NAME}-{INDEX}`
//! - Price: $0.99 - $49.99, cost 55-75% of price
//! - Stock: 0 - 60, loose goods (kg) get fractional stock
//! - Tax rate: 0%, 5%, 12% or 18%

use chrono::Utc;
use std::env;
use tally_core::{Customer, Product, Quantity, DEFAULT_LOW_STOCK_THRESHOLD};
use tally_db::{Database, DbConfig};

/// (category name, SKU code, unit, product names)
const CATALOG: &[(&str, &str, &str, &[&str])] = &[
    (
        "Food & Beverages",
        "FNB",
        "pcs",
        &["Cola", "Orange Juice", "Sparkling Water", "Green Tea", "Cold Brew"],
    ),
    (
        "Food & Beverages",
        "BLK",
        "kg",
        &["Basmati Rice", "Red Lentils", "Sugar", "Wheat Flour", "Chickpeas"],
    ),
    (
        "Electronics",
        "ELC",
        "pcs",
        &["USB-C Cable", "Power Bank", "Earbuds", "AA Batteries", "Phone Stand"],
    ),
    (
        "Clothing",
        "CLO",
        "pcs",
        &["Cotton T-Shirt", "Wool Socks", "Baseball Cap", "Rain Jacket"],
    ),
    (
        "Books",
        "BKS",
        "pcs",
        &["Notebook A5", "Sketch Pad", "Pocket Atlas", "Crossword Book"],
    ),
    (
        "Hardware",
        "HRD",
        "pcs",
        &["Duct Tape", "Screwdriver Set", "Wood Glue", "Cable Ties"],
    ),
    (
        "Pharmacy",
        "PHR",
        "pcs",
        &["Bandages", "Hand Sanitizer", "Vitamin C", "Cough Drops"],
    ),
    (
        "Cosmetics",
        "CSM",
        "pcs",
        &["Lip Balm", "Sunscreen", "Face Wash", "Shampoo"],
    ),
];

/// Size variants: (label, price add-on in cents)
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Regular", 150), ("Large", 400), ("Family", 900)];

/// Tax rates in basis points
const TAX_RATES: &[u32] = &[0, 500, 1200, 1800];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ana Silva", "555-201-0001"),
    ("Bram de Vries", "555-201-0002"),
    ("Chidi Okafor", "555-201-0003"),
    ("Dana Kim", "555-201-0004"),
    ("Elif Yilmaz", "555-201-0005"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    db.seed_defaults().await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied, defaults seeded");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let categories = db.categories().list_all().await?;
    let category_id = |name: &str| categories.iter().find(|c| c.name == name).map(|c| c.id);

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut batch = Vec::with_capacity(count);

    'outer: for (category, code, unit, names) in CATALOG {
        for name in names.iter() {
            for (size, addon) in SIZES {
                if batch.len() >= count {
                    break 'outer;
                }
                let seed = batch.len();
                batch.push(generate_product(
                    code,
                    name,
                    size,
                    unit,
                    *addon,
                    category_id(*category),
                    seed,
                ));
            }
        }
    }

    let generated = db.products().insert_many(&batch).await?;

    let now = Utc::now();
    let customers: Vec<Customer> = CUSTOMERS
        .iter()
        .map(|(name, phone)| Customer {
            id: 0,
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            address: None,
            notes: String::new(),
            total_purchases_cents: 0,
            created_at: now,
            updated_at: now,
        })
        .collect();
    db.customers().insert_many(&customers).await?;

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!("✓ Added {} customers", customers.len());

    let low = db
        .products()
        .list_all()
        .await?
        .iter()
        .filter(|p| p.is_low_stock())
        .count();
    println!("  {} products start at or below their low-stock threshold", low);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with plausible data.
fn generate_product(
    code: &str,
    name: &str,
    size: &str,
    unit: &str,
    price_addon: i64,
    category_id: Option<i64>,
    seed: usize,
) -> Product {
    let now = Utc::now();

    let short: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let sku = format!("{}-{}-{:03}", code, short, seed);

    // EAN-13 shaped, checksum not valid
    let barcode = Some(format!("590{:010}", seed));

    let price_cents = 99 + ((seed * 37) % 4000) as i64 + price_addon;
    let cost_cents = price_cents * (55 + (seed % 21) as i64) / 100;

    let stock = if unit == "kg" {
        Quantity::from_milli(((seed * 7919) % 60_000) as i64)
    } else {
        Quantity::from_units((seed % 61) as i64)
    };

    Product {
        id: 0,
        name: format!("{} {}", name, size),
        sku,
        barcode,
        category_id,
        description: String::new(),
        price_cents,
        cost_cents,
        stock,
        unit: unit.to_string(),
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        tax_rate_bps: TAX_RATES[seed % TAX_RATES.len()],
        created_at: now,
        updated_at: now,
    }
}
