//! # Receipt Commands
//!
//! Renders a stored sale with one of the built-in templates. `show` prints
//! the HTML fragment, `print` wraps it in a standalone document and `save`
//! writes that document to disk.

use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, info};

use tally_core::format::file_date;
use tally_core::receipt::{self, ReceiptTemplate};
use tally_core::{Customer, Sale};

use super::{write_file, Context};
use crate::cli::ReceiptCommand;
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: ReceiptCommand) -> Result<String, ApiError> {
    match command {
        ReceiptCommand::Templates => templates(ctx).await,
        ReceiptCommand::Show { sale, template } => {
            let (sale, customer) = load(ctx, sale).await?;
            Ok(render(ctx, &sale, customer.as_ref(), template))
        }
        ReceiptCommand::Print { sale, template } => {
            let (sale, customer) = load(ctx, sale).await?;
            let body = render(ctx, &sale, customer.as_ref(), template);
            Ok(receipt::document(sale.id, &body))
        }
        ReceiptCommand::Save { sale, template, dir } => save(ctx, sale, template, dir).await,
    }
}

async fn templates(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    let catalog = ctx.db.receipt_templates().list_all().await?;
    let default = ctx.settings.get().default_receipt_template;

    let rows: Vec<Vec<String>> = catalog
        .iter()
        .map(|t| {
            let marker = if t.key == default.key() {
                view::badge("default")
            } else {
                String::new()
            };
            vec![t.id.to_string(), t.key.clone(), t.name.clone(), marker]
        })
        .collect();

    Ok(view::sections(&[
        view::heading("Receipt Templates"),
        view::table(&["ID", "Key", "Name", ""], &rows, "No templates installed"),
    ]))
}

async fn save(
    ctx: &mut Context<'_>,
    sale: Option<i64>,
    template: Option<ReceiptTemplate>,
    dir: Option<PathBuf>,
) -> Result<String, ApiError> {
    let (sale, customer) = load(ctx, sale).await?;
    let body = render(ctx, &sale, customer.as_ref(), template);

    let name = receipt::receipt_filename(sale.id, &file_date(&Local::now()));
    let path = write_file(&ctx.output_dir(dir), &name, &receipt::document(sale.id, &body))?;
    info!(sale_id = sale.id, path = %path.display(), "Receipt saved");

    Ok(view::alert(
        Tone::Success,
        format!("Receipt saved to {}", path.display()),
    ))
}

// =============================================================================
// Helpers
// =============================================================================

/// The requested sale, or the last one checked out in this session.
async fn load(ctx: &Context<'_>, sale_id: Option<i64>) -> Result<(Sale, Option<Customer>), ApiError> {
    let id = sale_id
        .or(ctx.session.last_sale)
        .ok_or_else(|| ApiError::validation("No sale given and none completed in this session"))?;
    debug!(sale_id = id, "loading sale for receipt");

    let sale = ctx
        .db
        .sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", id))?;

    // A deleted customer still gets a receipt, as walk-in.
    let customer = match sale.customer_id {
        Some(customer_id) => ctx.db.customers().get_by_id(customer_id).await?,
        None => None,
    };
    Ok((sale, customer))
}

fn render(
    ctx: &Context<'_>,
    sale: &Sale,
    customer: Option<&Customer>,
    template: Option<ReceiptTemplate>,
) -> String {
    let settings = ctx.settings.get();
    template
        .unwrap_or(settings.default_receipt_template)
        .render(sale, customer, &settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use tally_core::{Cart, PaymentMethod};

    async fn sell(h: &Harness, customer: Option<i64>) -> Sale {
        let tea = h.product("Tea", 1000, 10).await;
        let mut cart = Cart::new();
        cart.add_item(&tea).unwrap();
        cart.select_customer(customer);
        h.db.sales()
            .commit(&cart.to_sale(PaymentMethod::Cash, Utc::now()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_templates_marks_default() {
        let mut h = Harness::new().await;
        let out = handle(&mut h.ctx(), ReceiptCommand::Templates).await.unwrap();

        assert_eq!(
            out.lines().filter(|l| l.contains("thermal-") || l.contains("a4-")).count(),
            7
        );
        let line = out
            .lines()
            .find(|l| l.contains("thermal-80-standard"))
            .unwrap();
        assert!(line.contains("[default]"));
    }

    #[tokio::test]
    async fn test_show_uses_requested_template() {
        let mut h = Harness::new().await;
        let ana = h.customer("Ana", "555-123-4567").await;
        let sale = sell(&h, Some(ana.id)).await;

        let out = handle(
            &mut h.ctx(),
            ReceiptCommand::Show {
                sale: Some(sale.id),
                template: Some(ReceiptTemplate::A4Invoice),
            },
        )
        .await
        .unwrap();
        assert!(out.contains(r#"class="receipt a4-invoice""#));
        assert!(out.contains("Ana"));
        assert!(!out.contains("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_defaults_to_last_sale() {
        let mut h = Harness::new().await;

        let err = handle(
            &mut h.ctx(),
            ReceiptCommand::Print {
                sale: None,
                template: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let sale = sell(&h, None).await;
        h.session.last_sale = Some(sale.id);

        let out = handle(
            &mut h.ctx(),
            ReceiptCommand::Print {
                sale: None,
                template: None,
            },
        )
        .await
        .unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains(&format!("<title>Receipt #{}</title>", sale.id)));
        assert!(out.contains(r#"class="receipt thermal-80""#));
    }

    #[tokio::test]
    async fn test_unknown_sale() {
        let mut h = Harness::new().await;
        let err = handle(
            &mut h.ctx(),
            ReceiptCommand::Show {
                sale: Some(42),
                template: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_save_writes_document() {
        let mut h = Harness::new().await;
        let sale = sell(&h, None).await;
        let dir = tempfile::tempdir().unwrap();

        let out = handle(
            &mut h.ctx(),
            ReceiptCommand::Save {
                sale: Some(sale.id),
                template: Some(ReceiptTemplate::Thermal58Minimal),
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Receipt saved to"));

        let name = receipt::receipt_filename(sale.id, &file_date(&Local::now()));
        let written = std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(written.contains(r#"class="receipt thermal-58""#));
    }
}
