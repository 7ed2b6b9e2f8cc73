//! # Report Commands
//!
//! Every report is computed in tally-core from full collections read here;
//! date windows are evaluated against the operator's local clock.
//!
//! ```text
//! reports summary   --range R  ──► stat cards
//! reports sales     --range R  ──► stat cards + sales table
//! reports inventory            ──► counts + product table
//! reports customers            ──► counts + top ten by purchases
//! reports tax       --range R  ──► tax collected + per-sale tax
//! reports export KIND          ──► {kind}_report[_{range}]_{date}.csv
//! ```

use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, info};

use tally_core::export::to_csv;
use tally_core::format::{file_date, DateStyle};
use tally_core::report::{self, DateRange, ReportKind, SalesStats};
use tally_core::{Customer, Sale, Settings};

use super::products::product_table;
use super::{local_date, write_file, Context};
use crate::cli::ReportCommand;
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: ReportCommand) -> Result<String, ApiError> {
    match command {
        ReportCommand::Summary { range } => summary(ctx, range).await,
        ReportCommand::Sales { range } => sales(ctx, range).await,
        ReportCommand::Inventory => inventory(ctx).await,
        ReportCommand::Customers => customers(ctx).await,
        ReportCommand::Tax { range } => tax(ctx, range).await,
        ReportCommand::Export { kind, range, dir } => export(ctx, kind, range, dir).await,
    }
}

async fn summary(ctx: &mut Context<'_>, range: DateRange) -> Result<String, ApiError> {
    let sales = ctx.db.sales().list_all().await?;
    let report = report::sales_report(&sales, range, &Local::now());

    Ok(view::sections(&[
        view::heading(&format!("Summary: {}", range.label())),
        stats_cards(&report.stats, &ctx.settings.get()),
    ]))
}

async fn sales(ctx: &mut Context<'_>, range: DateRange) -> Result<String, ApiError> {
    let sales = ctx.db.sales().list_all().await?;
    let customers = ctx.db.customers().list_all().await?;
    let settings = ctx.settings.get();
    let report = report::sales_report(&sales, range, &Local::now());

    Ok(view::sections(&[
        view::heading(&format!("Sales Report: {}", range.label())),
        stats_cards(&report.stats, &settings),
        sales_table(&report.sales, &customers, &settings),
    ]))
}

async fn inventory(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    let products = ctx.db.products().list_all().await?;
    let categories = ctx.db.categories().list_all().await?;
    let settings = ctx.settings.get();
    let report = report::inventory_report(&products);

    let listed: Vec<_> = report.products.iter().collect();
    Ok(view::sections(&[
        view::heading("Inventory Report"),
        view::stat_cards(&[
            ("Products", report.total_products.to_string()),
            ("Low Stock", report.low_stock.to_string()),
            ("Out of Stock", report.out_of_stock.to_string()),
            ("Inventory Value", settings.format_money(report.inventory_value)),
        ]),
        product_table(&listed, &categories, &settings),
    ]))
}

async fn customers(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    let customers = ctx.db.customers().list_all().await?;
    let settings = ctx.settings.get();
    let report = report::customer_report(&customers);

    let rows: Vec<Vec<String>> = report
        .top_customers
        .iter()
        .enumerate()
        .map(|(rank, c)| {
            vec![
                (rank + 1).to_string(),
                c.name.clone(),
                c.phone.clone(),
                settings.format_money(c.total_purchases()),
            ]
        })
        .collect();

    Ok(view::sections(&[
        view::heading("Customer Report"),
        view::stat_cards(&[
            ("Customers", report.total_customers.to_string()),
            ("Total Revenue", settings.format_money(report.total_revenue)),
        ]),
        view::heading("Top Customers"),
        view::table(
            &["#", "Name", "Phone", "Total Purchases"],
            &rows,
            "No customers yet",
        ),
    ]))
}

async fn tax(ctx: &mut Context<'_>, range: DateRange) -> Result<String, ApiError> {
    let sales = ctx.db.sales().list_all().await?;
    let settings = ctx.settings.get();
    let report = report::tax_report(&sales, range, &Local::now());

    let rows: Vec<Vec<String>> = report
        .sales
        .iter()
        .map(|s| {
            vec![
                format!("#{}", s.id),
                local_date(&s.date, DateStyle::DateTime),
                settings.format_money(s.subtotal()),
                settings.format_money(s.tax()),
                settings.format_money(s.total()),
            ]
        })
        .collect();

    Ok(view::sections(&[
        view::heading(&format!("Tax Report: {}", range.label())),
        view::stat_cards(&[
            (settings.tax_name.as_str(), settings.format_money(report.total_tax)),
            ("Taxable Sales", settings.format_money(report.total_sales)),
        ]),
        view::table(
            &["Sale", "Date", "Subtotal", "Tax", "Total"],
            &rows,
            "No sales in this period",
        ),
    ]))
}

/// Writes the report's records as CSV. An empty report is refused.
async fn export(
    ctx: &mut Context<'_>,
    kind: ReportKind,
    range: DateRange,
    dir: Option<PathBuf>,
) -> Result<String, ApiError> {
    debug!(%kind, %range, "reports export command");
    let now = Local::now();

    let csv = match kind {
        ReportKind::Sales => {
            let sales = ctx.db.sales().list_all().await?;
            to_csv(&report::sales_report(&sales, range, &now).sales)?
        }
        ReportKind::Tax => {
            let sales = ctx.db.sales().list_all().await?;
            to_csv(&report::tax_report(&sales, range, &now).sales)?
        }
        ReportKind::Inventory => {
            let products = ctx.db.products().list_all().await?;
            to_csv(&report::inventory_report(&products).products)?
        }
        ReportKind::Customers => {
            let customers = ctx.db.customers().list_all().await?;
            to_csv(&report::customer_report(&customers).top_customers)?
        }
    };

    let name = kind.filename(range, &file_date(&now));
    let path = write_file(&ctx.output_dir(dir), &name, &csv)?;
    info!(%kind, path = %path.display(), "Report exported");

    Ok(view::alert(
        Tone::Success,
        format!("Report exported to {}", path.display()),
    ))
}

// =============================================================================
// Shared Rendering
// =============================================================================

fn stats_cards(stats: &SalesStats, settings: &Settings) -> String {
    view::stat_cards(&[
        ("Revenue", settings.format_money(stats.revenue)),
        ("Transactions", stats.transactions.to_string()),
        ("Items Sold", stats.items_sold.to_string()),
        ("Average Sale", settings.format_money(stats.average_transaction)),
    ])
}

/// One row per sale. Customers are resolved from `customers`; a sale whose
/// customer is gone shows "Unknown".
pub(crate) fn sales_table(sales: &[Sale], customers: &[Customer], settings: &Settings) -> String {
    let rows: Vec<Vec<String>> = sales
        .iter()
        .map(|s| {
            let customer = match s.customer_id {
                None => "Walk-in".to_string(),
                Some(id) => customers
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            };
            vec![
                format!("#{}", s.id),
                local_date(&s.date, DateStyle::DateTime),
                customer,
                s.items_sold().to_string(),
                s.payment_method.as_str().to_uppercase(),
                settings.format_money(s.total()),
            ]
        })
        .collect();

    view::table(
        &["Sale", "Date", "Customer", "Items", "Payment", "Total"],
        &rows,
        "No sales yet",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use tally_core::{Cart, PaymentMethod, Quantity};

    async fn sell(h: &Harness, price_cents: i64, qty: i64, customer: Option<i64>) -> Sale {
        let product = h.product(&format!("Item {}", price_cents), price_cents, 100).await;
        let mut cart = Cart::new();
        cart.add_item(&product).unwrap();
        cart.set_quantity(0, Quantity::from_units(qty)).unwrap();
        cart.select_customer(customer);
        h.db.sales()
            .commit(&cart.to_sale(PaymentMethod::Card, Utc::now()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_summary_today() {
        let mut h = Harness::new().await;
        sell(&h, 1000, 2, None).await;
        sell(&h, 500, 1, None).await;

        let out = handle(&mut h.ctx(), ReportCommand::Summary { range: DateRange::Today })
            .await
            .unwrap();
        assert!(out.contains("Summary: Today"));
        // 22.00 + 5.50
        assert!(out.contains("$27.50"));
        assert!(out.contains("$13.75"));
    }

    #[tokio::test]
    async fn test_sales_report_names_customers() {
        let mut h = Harness::new().await;
        let ana = h.customer("Ana", "555-123-4567").await;
        sell(&h, 1000, 1, Some(ana.id)).await;
        sell(&h, 1000, 1, None).await;

        let out = handle(&mut h.ctx(), ReportCommand::Sales { range: DateRange::Week })
            .await
            .unwrap();
        assert!(out.contains("Sales Report: This Week"));
        assert!(out.contains("Ana"));
        assert!(out.contains("Walk-in"));
        assert!(out.contains("CARD"));
    }

    #[tokio::test]
    async fn test_empty_range_shows_message() {
        let mut h = Harness::new().await;
        let out = handle(
            &mut h.ctx(),
            ReportCommand::Sales {
                range: DateRange::Yesterday,
            },
        )
        .await
        .unwrap();
        assert!(out.contains("No sales yet"));
    }

    #[tokio::test]
    async fn test_inventory_counts() {
        let mut h = Harness::new().await;
        h.product("Tea", 1000, 50).await;
        h.product("Rice", 900, 3).await;
        h.product("Salt", 100, 0).await;

        let out = handle(&mut h.ctx(), ReportCommand::Inventory).await.unwrap();
        assert!(out.contains("Inventory Report"));
        assert!(out.contains("Out of stock"));
        assert!(out.contains("Low stock"));
    }

    #[tokio::test]
    async fn test_tax_report_totals() {
        let mut h = Harness::new().await;
        sell(&h, 1000, 3, None).await;

        let out = handle(&mut h.ctx(), ReportCommand::Tax { range: DateRange::Today })
            .await
            .unwrap();
        assert!(out.contains("$3.00"));
        assert!(out.contains("$33.00"));
    }

    #[tokio::test]
    async fn test_export_writes_csv() {
        let mut h = Harness::new().await;
        sell(&h, 1000, 1, None).await;
        let dir = tempfile::tempdir().unwrap();

        handle(
            &mut h.ctx(),
            ReportCommand::Export {
                kind: ReportKind::Sales,
                range: DateRange::Today,
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap();

        let name = ReportKind::Sales.filename(DateRange::Today, &file_date(&Local::now()));
        let csv = std::fs::read_to_string(dir.path().join(name)).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("id,date,customerId"));
        assert_eq!(lines.count(), 1);
    }

    #[tokio::test]
    async fn test_export_empty_report_refused() {
        let mut h = Harness::new().await;
        let dir = tempfile::tempdir().unwrap();

        let err = handle(
            &mut h.ctx(),
            ReportCommand::Export {
                kind: ReportKind::Customers,
                range: DateRange::Today,
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
