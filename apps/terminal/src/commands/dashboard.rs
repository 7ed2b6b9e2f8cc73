//! # Dashboard
//!
//! The landing screen: today's takings, record counts, the last five sales
//! and every product at or below the store-wide low-stock threshold.

use chrono::Local;

use tally_core::report;

use super::reports::sales_table;
use super::Context;
use crate::error::ApiError;
use crate::view;

pub async fn handle(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    let products = ctx.db.products().list_all().await?;
    let customers = ctx.db.customers().list_all().await?;
    let sales = ctx.db.sales().list_all().await?;
    let settings = ctx.settings.get();

    let board = report::dashboard(
        &products,
        &customers,
        &sales,
        settings.low_stock_threshold,
        &Local::now(),
    );

    let low_stock: Vec<Vec<String>> = board
        .low_stock
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.sku.clone(),
                format!("{} {}", p.stock, p.unit),
            ]
        })
        .collect();

    Ok(view::sections(&[
        view::heading(&settings.store_name),
        view::stat_cards(&[
            ("Today's Sales", settings.format_money(board.today_total)),
            ("Products", board.product_count.to_string()),
            ("Customers", board.customer_count.to_string()),
            ("Transactions", board.transaction_count.to_string()),
        ]),
        view::heading("Recent Sales"),
        sales_table(&board.recent_sales, &customers, &settings),
        view::heading(&format!("Low Stock ({})", board.low_stock.len())),
        view::table(
            &["ID", "Name", "SKU", "Stock"],
            &low_stock,
            "All products are well stocked",
        ),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use chrono::Utc;
    use tally_core::{Cart, PaymentMethod};

    #[tokio::test]
    async fn test_empty_store() {
        let mut h = Harness::new().await;
        let out = handle(&mut h.ctx()).await.unwrap();

        assert!(out.contains("My Store"));
        assert!(out.contains("$0.00"));
        assert!(out.contains("No sales yet"));
        assert!(out.contains("All products are well stocked"));
    }

    #[tokio::test]
    async fn test_counts_and_low_stock() {
        let mut h = Harness::new().await;
        let tea = h.product("Tea", 1000, 40).await;
        h.product("Rice", 900, 4).await;
        h.customer("Ana", "555-123-4567").await;

        let mut cart = Cart::new();
        cart.add_item(&tea).unwrap();
        h.db.sales()
            .commit(&cart.to_sale(PaymentMethod::Cash, Utc::now()).unwrap())
            .await
            .unwrap();

        let out = handle(&mut h.ctx()).await.unwrap();
        assert!(out.contains("$11.00"));
        assert!(out.contains("Low Stock (1)"));
        assert!(out.contains("SKU-RICE"));
        assert!(out.contains("#1"));
    }
}
