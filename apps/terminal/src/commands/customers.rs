//! # Customer Commands
//!
//! Customer records and their purchase history. `totalPurchases` is only
//! ever moved by checkout; editing a customer never touches it.

use chrono::Utc;
use tracing::{debug, info};

use tally_core::format::DateStyle;
use tally_core::search::{self, CUSTOMER_FIELDS};
use tally_core::validation::{validate_customer, validate_search_query};
use tally_core::{Customer, Settings};

use super::reports::sales_table;
use super::{cancelled, local_date, Context};
use crate::cli::{CustomerCommand, CustomerFields};
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: CustomerCommand) -> Result<String, ApiError> {
    match command {
        CustomerCommand::List { search } => list(ctx, search.as_deref().unwrap_or_default()).await,
        CustomerCommand::Show { id } => show(ctx, id).await,
        CustomerCommand::Add {
            name,
            phone,
            fields,
        } => add(ctx, name, phone, fields).await,
        CustomerCommand::Edit {
            id,
            name,
            phone,
            fields,
        } => edit(ctx, id, name, phone, fields).await,
        CustomerCommand::Delete { id } => delete(ctx, id).await,
    }
}

async fn list(ctx: &mut Context<'_>, query: &str) -> Result<String, ApiError> {
    let query = validate_search_query(query)?;
    debug!(query = %query, "customers list command");

    let customers = ctx.db.customers().list_all().await?;
    let matches = search::search(&customers, &query, CUSTOMER_FIELDS);
    let settings = ctx.settings.get();

    let rows: Vec<Vec<String>> = matches
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.phone.clone(),
                c.email.clone().unwrap_or_default(),
                settings.format_money(c.total_purchases()),
            ]
        })
        .collect();

    Ok(view::sections(&[
        view::heading(&format!("Customers ({})", matches.len())),
        view::table(
            &["ID", "Name", "Phone", "Email", "Total Purchases"],
            &rows,
            "No customers found",
        ),
    ]))
}

/// Details plus every sale attached to the customer.
async fn show(ctx: &mut Context<'_>, id: i64) -> Result<String, ApiError> {
    let customer = find(ctx, id).await?;
    let sales = ctx.db.sales().list_by_customer(id).await?;
    let settings = ctx.settings.get();

    Ok(view::sections(&[
        details(&customer, &settings),
        view::heading(&format!("Sales History ({})", sales.len())),
        sales_table(&sales, std::slice::from_ref(&customer), &settings),
    ]))
}

async fn add(
    ctx: &mut Context<'_>,
    name: String,
    phone: String,
    fields: CustomerFields,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let mut customer = Customer {
        id: 0,
        name,
        phone,
        email: None,
        address: None,
        notes: String::new(),
        total_purchases_cents: 0,
        created_at: now,
        updated_at: now,
    };
    apply_fields(&mut customer, fields);
    validate_customer(&customer)?;

    let saved = ctx.db.customers().insert(&customer).await?;
    info!(id = saved.id, "Customer created");

    Ok(view::sections(&[
        view::alert(Tone::Success, format!("Customer #{} added", saved.id)),
        details(&saved, &ctx.settings.get()),
    ]))
}

async fn edit(
    ctx: &mut Context<'_>,
    id: i64,
    name: Option<String>,
    phone: Option<String>,
    fields: CustomerFields,
) -> Result<String, ApiError> {
    let mut customer = find(ctx, id).await?;

    if let Some(name) = name {
        customer.name = name;
    }
    if let Some(phone) = phone {
        customer.phone = phone;
    }
    apply_fields(&mut customer, fields);
    validate_customer(&customer)?;

    let saved = ctx.db.customers().update(&customer).await?;
    info!(id = saved.id, "Customer updated");

    Ok(view::sections(&[
        view::alert(Tone::Success, format!("Customer #{} updated", saved.id)),
        details(&saved, &ctx.settings.get()),
    ]))
}

async fn delete(ctx: &mut Context<'_>, id: i64) -> Result<String, ApiError> {
    let customer = find(ctx, id).await?;

    if !ctx.confirm(&format!("Delete customer '{}'?", customer.name)) {
        return Ok(cancelled());
    }

    ctx.db.customers().delete(id).await?;
    if ctx.session.cart.customer_id == Some(id) {
        ctx.session.cart.select_customer(None);
    }

    info!(id, "Customer deleted");
    Ok(view::alert(
        Tone::Success,
        format!("Customer '{}' deleted", customer.name),
    ))
}

// =============================================================================
// Helpers
// =============================================================================

pub(crate) async fn find(ctx: &Context<'_>, id: i64) -> Result<Customer, ApiError> {
    ctx.db
        .customers()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", id))
}

/// Blank strings clear the optional fields.
fn apply_fields(customer: &mut Customer, fields: CustomerFields) {
    let optional = |value: String| {
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    };

    if let Some(email) = fields.email {
        customer.email = optional(email);
    }
    if let Some(address) = fields.address {
        customer.address = optional(address);
    }
    if let Some(notes) = fields.notes {
        customer.notes = notes;
    }
}

fn details(customer: &Customer, settings: &Settings) -> String {
    view::sections(&[
        view::heading(&customer.name),
        view::details(&[
            ("ID", customer.id.to_string()),
            ("Phone", customer.phone.clone()),
            ("Email", customer.email.clone().unwrap_or_else(|| "-".into())),
            ("Address", customer.address.clone().unwrap_or_else(|| "-".into())),
            ("Notes", customer.notes.clone()),
            ("Total purchases", settings.format_money(customer.total_purchases())),
            ("Customer since", local_date(&customer.created_at, DateStyle::Long)),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::error::ErrorCode;
    use tally_core::{Cart, PaymentMethod};

    #[tokio::test]
    async fn test_add_validates_phone_and_email() {
        let mut h = Harness::new().await;

        let err = handle(
            &mut h.ctx(),
            CustomerCommand::Add {
                name: "Ana".into(),
                phone: "12".into(),
                fields: CustomerFields::default(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = handle(
            &mut h.ctx(),
            CustomerCommand::Add {
                name: "Ana".into(),
                phone: "555-123-4567".into(),
                fields: CustomerFields {
                    email: Some("ana@nowhere".into()),
                    ..CustomerFields::default()
                },
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let out = handle(
            &mut h.ctx(),
            CustomerCommand::Add {
                name: "Ana".into(),
                phone: "555-123-4567".into(),
                fields: CustomerFields {
                    email: Some("ana@example.com".into()),
                    ..CustomerFields::default()
                },
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Customer #1 added"));
        assert_eq!(h.db.customers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_search_matches_phone() {
        let mut h = Harness::new().await;
        h.customer("Ana Silva", "555-201-0001").await;
        h.customer("Bram de Vries", "555-999-0002").await;

        let out = handle(
            &mut h.ctx(),
            CustomerCommand::List {
                search: Some("999".into()),
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Customers (1)"));
        assert!(out.contains("Bram de Vries"));
        assert!(!out.contains("Ana Silva"));
    }

    #[tokio::test]
    async fn test_show_lists_sales_history() {
        let mut h = Harness::new().await;
        let ana = h.customer("Ana", "555-123-4567").await;
        let tea = h.product("Tea", 1000, 10).await;

        let mut cart = Cart::new();
        cart.add_item(&tea).unwrap();
        cart.select_customer(Some(ana.id));
        let sale = h
            .db
            .sales()
            .commit(&cart.to_sale(PaymentMethod::Card, Utc::now()).unwrap())
            .await
            .unwrap();

        let out = handle(&mut h.ctx(), CustomerCommand::Show { id: ana.id })
            .await
            .unwrap();
        assert!(out.contains("Sales History (1)"));
        assert!(out.contains(&format!("#{}", sale.id)));
        assert!(out.contains("$11.00"));
    }

    #[tokio::test]
    async fn test_edit_keeps_total_purchases() {
        let mut h = Harness::new().await;
        let ana = h.customer("Ana", "555-123-4567").await;
        let tea = h.product("Tea", 1000, 10).await;

        let mut cart = Cart::new();
        cart.add_item(&tea).unwrap();
        cart.select_customer(Some(ana.id));
        h.db.sales()
            .commit(&cart.to_sale(PaymentMethod::Cash, Utc::now()).unwrap())
            .await
            .unwrap();

        handle(
            &mut h.ctx(),
            CustomerCommand::Edit {
                id: ana.id,
                name: Some("Ana Silva".into()),
                phone: None,
                fields: CustomerFields {
                    address: Some("  ".into()),
                    ..CustomerFields::default()
                },
            },
        )
        .await
        .unwrap();

        let stored = h.db.customers().get_by_id(ana.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ana Silva");
        assert_eq!(stored.address, None);
        assert_eq!(stored.total_purchases_cents, 1100);
    }

    #[tokio::test]
    async fn test_delete_deselects_from_cart() {
        let mut h = Harness::new().await;
        let ana = h.customer("Ana", "555-123-4567").await;
        h.session.cart.select_customer(Some(ana.id));

        handle(&mut h.ctx(), CustomerCommand::Delete { id: ana.id })
            .await
            .unwrap();

        assert_eq!(h.session.cart.customer_id, None);
        assert!(h.db.customers().get_by_id(ana.id).await.unwrap().is_none());
    }
}
