//! # POS Commands
//!
//! The cart lives in the session; only checkout writes to the store.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    pos checkout <payment>                               │
//! │                                                                         │
//! │  CheckoutAttempt::new()                          Idle                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  attempt.prepare(&cart, payment, now)            Validating             │
//! │       │  empty cart? ──────────────────────────► Failed ──► CartError   │
//! │       ▼                                                                 │
//! │  db.sales().commit(&sale)                        Committing             │
//! │       │  ONE transaction:                                               │
//! │       │   insert sale + items                                           │
//! │       │   per line: live stock ≥ qty? decrement                         │
//! │       │   customer total += sale total                                  │
//! │       │  any failure ──► ROLLBACK ─────────────► Failed ──► error       │
//! │       ▼                                                                 │
//! │  attempt.succeed()                               Success                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  clear cart + customer, remember sale id,                               │
//! │  render receipt with the default template                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed checkout leaves the cart as it was so the operator can fix the
//! quantities and try again with a new attempt.

use chrono::Utc;
use tracing::{debug, info, warn};

use tally_core::search::{self, filter_by_category, POS_PICKER_FIELDS};
use tally_core::validation::validate_search_query;
use tally_core::{CheckoutAttempt, CoreError, PaymentMethod, Quantity, TaxRate};

use super::products::stock_badge;
use super::{cancelled, customers, Context};
use crate::cli::PosCommand;
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: PosCommand) -> Result<String, ApiError> {
    match command {
        PosCommand::Browse { search, category } => {
            browse(ctx, search.as_deref().unwrap_or_default(), category).await
        }
        PosCommand::Add { product } => add(ctx, product).await,
        PosCommand::Qty { line, qty } => set_quantity(ctx, line, qty).await,
        PosCommand::Remove { line } => {
            let index = line_index(line)?;
            ctx.session.cart.remove_item(index)?;
            render_cart(ctx, view::alert(Tone::Success, format!("Line {} removed", line))).await
        }
        PosCommand::Cart => render_cart(ctx, String::new()).await,
        PosCommand::Customer { id, none } => select_customer(ctx, id, none).await,
        PosCommand::Clear => clear(ctx),
        PosCommand::Checkout { payment } => checkout(ctx, payment).await,
    }
}

/// Product picker: name, SKU and barcode search.
async fn browse(ctx: &mut Context<'_>, query: &str, category: Option<i64>) -> Result<String, ApiError> {
    let query = validate_search_query(query)?;
    debug!(query = %query, "pos browse command");

    let products = ctx.db.products().list_all().await?;
    let matches = filter_by_category(
        search::search(&products, &query, POS_PICKER_FIELDS),
        category,
    );
    let settings = ctx.settings.get();

    let rows: Vec<Vec<String>> = matches
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.sku.clone(),
                settings.format_money(p.price()),
                format!("{} {}", p.stock, p.unit),
                stock_badge(p),
            ]
        })
        .collect();

    Ok(view::table(
        &["ID", "Name", "SKU", "Price", "Stock", "Status"],
        &rows,
        "No products match",
    ))
}

async fn add(ctx: &mut Context<'_>, product_id: i64) -> Result<String, ApiError> {
    debug!(product_id, "pos add command");

    let product = ctx
        .db
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(product_id))?;

    ctx.session.cart.add_item(&product)?;
    render_cart(ctx, view::alert(Tone::Success, format!("Added {}", product.name))).await
}

async fn set_quantity(ctx: &mut Context<'_>, line: usize, qty: Quantity) -> Result<String, ApiError> {
    let index = line_index(line)?;
    ctx.session.cart.set_quantity(index, qty)?;

    let message = if qty.is_positive() {
        format!("Line {} set to {}", line, qty)
    } else {
        format!("Line {} removed", line)
    };
    render_cart(ctx, view::alert(Tone::Success, message)).await
}

async fn select_customer(ctx: &mut Context<'_>, id: Option<i64>, none: bool) -> Result<String, ApiError> {
    match id {
        Some(id) => {
            let customer = customers::find(ctx, id).await?;
            ctx.session.cart.select_customer(Some(customer.id));
            render_cart(
                ctx,
                view::alert(Tone::Success, format!("Customer: {}", customer.name)),
            )
            .await
        }
        None if none => {
            ctx.session.cart.select_customer(None);
            render_cart(ctx, view::alert(Tone::Success, "Customer: Walk-in")).await
        }
        None => render_cart(ctx, String::new()).await,
    }
}

fn clear(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    if ctx.session.cart.is_empty() && ctx.session.cart.customer_id.is_none() {
        return Ok(view::alert(Tone::Info, "Cart is already empty"));
    }
    if !ctx.confirm("Clear the cart?") {
        return Ok(cancelled());
    }

    ctx.session.cart.clear();
    Ok(view::alert(Tone::Success, "Cart cleared"))
}

async fn checkout(ctx: &mut Context<'_>, payment: PaymentMethod) -> Result<String, ApiError> {
    let session = ctx.session.id;
    debug!(%session, %payment, "pos checkout command");

    let mut attempt = CheckoutAttempt::new();
    let sale = attempt.prepare(&ctx.session.cart, payment, Utc::now())?;

    let committed = match ctx.db.sales().commit(&sale).await {
        Ok(committed) => {
            attempt.succeed()?;
            committed
        }
        Err(err) => {
            attempt.fail(err.to_string())?;
            warn!(%session, error = %err, "Checkout failed, nothing was written");
            return Err(err.into());
        }
    };

    info!(
        %session,
        sale_id = committed.id,
        total = committed.total_cents,
        items = committed.items.len(),
        "Checkout complete"
    );

    ctx.session.cart.clear();
    ctx.session.last_sale = Some(committed.id);

    let settings = ctx.settings.get();
    // Already committed: a failed lookup falls back to walk-in.
    let customer = match committed.customer_id {
        Some(id) => match ctx.db.customers().get_by_id(id).await {
            Ok(customer) => customer,
            Err(err) => {
                warn!(%session, customer_id = id, error = %err, "Receipt rendered as walk-in");
                None
            }
        },
        None => None,
    };
    let receipt = settings
        .default_receipt_template
        .render(&committed, customer.as_ref(), &settings);

    Ok(view::sections(&[
        view::alert(
            Tone::Success,
            format!(
                "Sale #{} completed: {} ({})",
                committed.id,
                settings.format_money(committed.total()),
                committed.payment_method.as_str().to_uppercase()
            ),
        ),
        receipt,
    ]))
}

// =============================================================================
// Rendering
// =============================================================================

/// Lines are numbered from 1 on screen.
fn line_index(line: usize) -> Result<usize, CoreError> {
    line.checked_sub(1).ok_or(CoreError::LineNotFound(line))
}

async fn render_cart(ctx: &mut Context<'_>, notice: String) -> Result<String, ApiError> {
    let settings = ctx.settings.get();
    let cart = &ctx.session.cart;

    let customer = match cart.customer_id {
        Some(id) => ctx
            .db
            .customers()
            .get_by_id(id)
            .await?
            .map(|c| c.name)
            .unwrap_or_else(|| format!("#{} (missing)", id)),
        None => "Walk-in".to_string(),
    };

    let rows: Vec<Vec<String>> = cart
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            vec![
                (i + 1).to_string(),
                line.name.clone(),
                settings.format_money(line.price()),
                format!("{} {}", line.quantity, line.unit),
                format!("{}%", TaxRate::from_bps(line.tax_rate_bps)),
                settings.format_money(line.line_total()),
            ]
        })
        .collect();

    let totals = cart.compute_totals()?;
    Ok(view::sections(&[
        notice,
        view::heading("Cart"),
        view::table(
            &["#", "Item", "Price", "Qty", "Tax", "Amount"],
            &rows,
            "Cart is empty",
        ),
        view::details(&[
            ("Customer", customer),
            (
                "Items",
                format!("{} ({} units)", cart.item_count(), cart.total_quantity()),
            ),
            ("Subtotal", settings.format_money(totals.subtotal)),
            ("Tax", settings.format_money(totals.tax)),
            ("Total", settings.format_money(totals.total)),
        ]),
    ]))
}
