//! # Product Commands
//!
//! Catalog maintenance: list/search, details, create, edit, delete and
//! manual stock adjustment.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products add --name Tea --price 2.50                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build record (store tax rate, unit "pcs", threshold 10)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  no --sku? ──► generate_sku("PRD") ──► PRD-LQ3K9X-4F2A                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  category exists? ──► validate_product() ──► products().insert()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info};

use tally_core::format::DateStyle;
use tally_core::report::effective_threshold;
use tally_core::search::{self, filter_by_category, PRODUCT_LIST_FIELDS};
use tally_core::validation::{
    generate_sku, validate_product, validate_search_query, validate_stock_adjustment,
};
use tally_core::{Category, Money, Product, Quantity, Settings, TaxRate, DEFAULT_LOW_STOCK_THRESHOLD};

use super::{cancelled, local_date, Context};
use crate::cli::{ProductCommand, ProductFields};
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: ProductCommand) -> Result<String, ApiError> {
    match command {
        ProductCommand::List { search, category } => {
            list(ctx, search.as_deref().unwrap_or_default(), category).await
        }
        ProductCommand::Show { id } => show(ctx, id).await,
        ProductCommand::Add {
            name,
            price,
            fields,
        } => add(ctx, name, price, fields).await,
        ProductCommand::Edit {
            id,
            name,
            price,
            fields,
        } => edit(ctx, id, name, price, fields).await,
        ProductCommand::Delete { id } => delete(ctx, id).await,
        ProductCommand::AdjustStock { id, amount, reason } => {
            adjust_stock(ctx, id, amount, reason).await
        }
    }
}

async fn list(ctx: &mut Context<'_>, query: &str, category: Option<i64>) -> Result<String, ApiError> {
    let query = validate_search_query(query)?;
    debug!(query = %query, ?category, "products list command");

    let products = ctx.db.products().list_all().await?;
    let categories = ctx.db.categories().list_all().await?;
    let matches = filter_by_category(
        search::search(&products, &query, PRODUCT_LIST_FIELDS),
        category,
    );

    let settings = ctx.settings.get();
    Ok(view::sections(&[
        view::heading(&format!("Products ({})", matches.len())),
        product_table(&matches, &categories, &settings),
    ]))
}

async fn show(ctx: &mut Context<'_>, id: i64) -> Result<String, ApiError> {
    let product = find(ctx, id).await?;
    let categories = ctx.db.categories().list_all().await?;
    Ok(details(&product, &categories, &ctx.settings.get()))
}

async fn add(
    ctx: &mut Context<'_>,
    name: String,
    price: Money,
    fields: ProductFields,
) -> Result<String, ApiError> {
    let settings = ctx.settings.get();
    let now = Utc::now();

    let mut product = Product {
        id: 0,
        name,
        sku: String::new(),
        barcode: None,
        category_id: None,
        description: String::new(),
        price_cents: price.cents(),
        cost_cents: 0,
        stock: Quantity::zero(),
        unit: "pcs".to_string(),
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        tax_rate_bps: if settings.tax_enabled {
            settings.tax_rate_bps
        } else {
            0
        },
        created_at: now,
        updated_at: now,
    };
    apply_fields(&mut product, fields);
    if product.sku.trim().is_empty() {
        product.sku = generate_sku("PRD", now);
    }

    ensure_category(ctx, product.category_id).await?;
    validate_product(&product)?;

    let saved = ctx.db.products().insert(&product).await?;
    info!(id = saved.id, sku = %saved.sku, "Product created");

    let categories = ctx.db.categories().list_all().await?;
    Ok(view::sections(&[
        view::alert(Tone::Success, format!("Product #{} added", saved.id)),
        details(&saved, &categories, &settings),
    ]))
}

async fn edit(
    ctx: &mut Context<'_>,
    id: i64,
    name: Option<String>,
    price: Option<Money>,
    fields: ProductFields,
) -> Result<String, ApiError> {
    let mut product = find(ctx, id).await?;

    if let Some(name) = name {
        product.name = name;
    }
    if let Some(price) = price {
        product.price_cents = price.cents();
    }
    apply_fields(&mut product, fields);

    ensure_category(ctx, product.category_id).await?;
    validate_product(&product)?;

    let saved = ctx.db.products().update(&product).await?;
    info!(id = saved.id, "Product updated");

    let categories = ctx.db.categories().list_all().await?;
    Ok(view::sections(&[
        view::alert(Tone::Success, format!("Product #{} updated", saved.id)),
        details(&saved, &categories, &ctx.settings.get()),
    ]))
}

async fn delete(ctx: &mut Context<'_>, id: i64) -> Result<String, ApiError> {
    let product = find(ctx, id).await?;

    if !ctx.confirm(&format!("Delete product '{}'?", product.name)) {
        return Ok(cancelled());
    }

    ctx.db.products().delete(id).await?;
    info!(id, "Product deleted");
    Ok(view::alert(
        Tone::Success,
        format!("Product '{}' deleted", product.name),
    ))
}

async fn adjust_stock(
    ctx: &mut Context<'_>,
    id: i64,
    amount: Quantity,
    reason: Option<String>,
) -> Result<String, ApiError> {
    validate_stock_adjustment(amount)?;

    let product = ctx.db.products().adjust_stock(id, amount).await?;
    info!(
        id,
        delta = %amount,
        stock = %product.stock,
        reason = reason.as_deref().unwrap_or(""),
        "Stock adjusted"
    );

    Ok(view::alert(
        Tone::Success,
        format!(
            "Stock for {} is now {} {}",
            product.name, product.stock, product.unit
        ),
    ))
}

// =============================================================================
// Helpers
// =============================================================================

async fn find(ctx: &Context<'_>, id: i64) -> Result<Product, ApiError> {
    ctx.db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

async fn ensure_category(ctx: &Context<'_>, category_id: Option<i64>) -> Result<(), ApiError> {
    if let Some(id) = category_id {
        if ctx.db.categories().get_by_id(id).await?.is_none() {
            return Err(ApiError::not_found("Category", id));
        }
    }
    Ok(())
}

fn apply_fields(product: &mut Product, fields: ProductFields) {
    let ProductFields {
        sku,
        barcode,
        category,
        description,
        cost,
        stock,
        unit,
        low_stock,
        tax,
    } = fields;

    if let Some(sku) = sku {
        product.sku = sku.trim().to_string();
    }
    if let Some(barcode) = barcode {
        let barcode = barcode.trim();
        product.barcode = (!barcode.is_empty()).then(|| barcode.to_string());
    }
    if let Some(category) = category {
        product.category_id = Some(category);
    }
    if let Some(description) = description {
        product.description = description;
    }
    if let Some(cost) = cost {
        product.cost_cents = cost.cents();
    }
    if let Some(stock) = stock {
        product.stock = stock;
    }
    if let Some(unit) = unit {
        product.unit = unit;
    }
    if let Some(threshold) = low_stock {
        product.low_stock_threshold = threshold;
    }
    if let Some(tax) = tax {
        product.tax_rate_bps = tax.bps();
    }
}

pub(crate) fn category_name(categories: &[Category], id: Option<i64>) -> String {
    id.and_then(|id| categories.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "-".to_string())
}

/// Out of stock, at or below the product's threshold, or fine.
pub(crate) fn stock_badge(product: &Product) -> String {
    if product.is_out_of_stock() {
        view::badge("Out of stock")
    } else if product.is_at_or_below(effective_threshold(product.low_stock_threshold)) {
        view::badge("Low stock")
    } else {
        view::badge("In stock")
    }
}

pub(crate) fn product_table(products: &[&Product], categories: &[Category], settings: &Settings) -> String {
    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.sku.clone(),
                category_name(categories, p.category_id),
                settings.format_money(p.price()),
                format!("{} {}", p.stock, p.unit),
                stock_badge(p),
            ]
        })
        .collect();

    view::table(
        &["ID", "Name", "SKU", "Category", "Price", "Stock", "Status"],
        &rows,
        "No products found",
    )
}

fn details(product: &Product, categories: &[Category], settings: &Settings) -> String {
    view::sections(&[
        view::heading(&product.name),
        view::details(&[
            ("ID", product.id.to_string()),
            ("SKU", product.sku.clone()),
            ("Barcode", product.barcode.clone().unwrap_or_else(|| "-".into())),
            ("Category", category_name(categories, product.category_id)),
            ("Description", product.description.clone()),
            ("Price", settings.format_money(product.price())),
            ("Cost", settings.format_money(product.cost())),
            ("Tax", TaxRate::from_bps(product.tax_rate_bps).to_string()),
            ("Stock", format!("{} {}", product.stock, product.unit)),
            ("Low stock at", product.low_stock_threshold.to_string()),
            ("Status", stock_badge(product)),
            ("Inventory value", settings.format_money(product.inventory_value())),
            ("Updated", local_date(&product.updated_at, DateStyle::DateTime)),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::error::ErrorCode;
    use crate::prompt::AutoConfirm;

    fn add_command(name: &str, price: i64, fields: ProductFields) -> ProductCommand {
        ProductCommand::Add {
            name: name.to_string(),
            price: Money::from_cents(price),
            fields,
        }
    }

    #[tokio::test]
    async fn test_add_generates_sku_and_uses_store_tax() {
        let mut h = Harness::new().await;
        let out = handle(&mut h.ctx(), add_command("Green Tea", 250, ProductFields::default()))
            .await
            .unwrap();
        assert!(out.contains("Product #1 added"));

        let product = h.db.products().get_by_id(1).await.unwrap().unwrap();
        assert!(product.sku.starts_with("PRD-"));
        assert_eq!(product.tax_rate_bps, h.settings().tax_rate_bps);
        assert_eq!(product.unit, "pcs");
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let mut h = Harness::new().await;

        let err = handle(&mut h.ctx(), add_command("Tea", -5, ProductFields::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let fields = ProductFields {
            category: Some(999),
            ..ProductFields::default()
        };
        let err = handle(&mut h.ctx(), add_command("Tea", 100, fields))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert_eq!(h.db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_searches_and_filters() {
        let mut h = Harness::new().await;
        let tea = h.product("Green Tea", 250, 20).await;
        h.product("Rice", 900, 20).await;

        let categories = h.db.categories().list_all().await.unwrap();
        let mut edited = tea.clone();
        edited.category_id = Some(categories[0].id);
        h.db.products().update(&edited).await.unwrap();

        let out = handle(
            &mut h.ctx(),
            ProductCommand::List {
                search: Some("TEA".into()),
                category: None,
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Products (1)"));
        assert!(out.contains("Green Tea"));
        assert!(!out.contains("Rice"));

        let out = handle(
            &mut h.ctx(),
            ProductCommand::List {
                search: None,
                category: Some(categories[1].id),
            },
        )
        .await
        .unwrap();
        assert!(out.contains("No products found"));
    }

    #[tokio::test]
    async fn test_edit_changes_only_given_fields() {
        let mut h = Harness::new().await;
        let tea = h.product("Tea", 250, 20).await;

        let fields = ProductFields {
            stock: Some(Quantity::from_milli(2500)),
            unit: Some("kg".into()),
            ..ProductFields::default()
        };
        handle(
            &mut h.ctx(),
            ProductCommand::Edit {
                id: tea.id,
                name: None,
                price: Some(Money::from_cents(300)),
                fields,
            },
        )
        .await
        .unwrap();

        let stored = h.db.products().get_by_id(tea.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Tea");
        assert_eq!(stored.price_cents, 300);
        assert_eq!(stored.stock, Quantity::from_milli(2500));
        assert_eq!(stored.unit, "kg");
        assert_eq!(stored.sku, tea.sku);
    }

    #[tokio::test]
    async fn test_edit_missing_product() {
        let mut h = Harness::new().await;
        let err = handle(
            &mut h.ctx(),
            ProductCommand::Edit {
                id: 42,
                name: Some("Ghost".into()),
                price: None,
                fields: ProductFields::default(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 42");
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let mut h = Harness::new().await;
        let tea = h.product("Tea", 250, 20).await;

        h.prompt = AutoConfirm(false);
        let out = handle(&mut h.ctx(), ProductCommand::Delete { id: tea.id })
            .await
            .unwrap();
        assert_eq!(out, cancelled());
        assert_eq!(h.db.products().count().await.unwrap(), 1);

        h.prompt = AutoConfirm(true);
        handle(&mut h.ctx(), ProductCommand::Delete { id: tea.id })
            .await
            .unwrap();
        assert_eq!(h.db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let mut h = Harness::new().await;
        let tea = h.product("Tea", 250, 5).await;

        let out = handle(
            &mut h.ctx(),
            ProductCommand::AdjustStock {
                id: tea.id,
                amount: Quantity::from_units(-2),
                reason: Some("damaged".into()),
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Stock for Tea is now 3 pcs"));

        let err = handle(
            &mut h.ctx(),
            ProductCommand::AdjustStock {
                id: tea.id,
                amount: Quantity::from_units(-4),
                reason: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = handle(
            &mut h.ctx(),
            ProductCommand::AdjustStock {
                id: tea.id,
                amount: Quantity::zero(),
                reason: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let stored = h.db.products().get_by_id(tea.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, Quantity::from_units(3));
    }

    #[test]
    fn test_stock_badge_uses_default_threshold_when_unset() {
        let now = Utc::now();
        let mut product = Product {
            id: 1,
            name: "Tea".into(),
            sku: "T-1".into(),
            barcode: None,
            category_id: None,
            description: String::new(),
            price_cents: 100,
            cost_cents: 0,
            stock: Quantity::from_units(8),
            unit: "pcs".into(),
            low_stock_threshold: Quantity::zero(),
            tax_rate_bps: 0,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(stock_badge(&product), "[Low stock]");

        product.stock = Quantity::from_units(11);
        assert_eq!(stock_badge(&product), "[In stock]");

        product.stock = Quantity::zero();
        assert_eq!(stock_badge(&product), "[Out of stock]");
    }
}
