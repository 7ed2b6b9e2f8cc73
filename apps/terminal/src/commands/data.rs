//! # Data Commands
//!
//! Moving whole collections in and out of the store.
//!
//! ```text
//! export   collection ──► to_json / to_csv ──► {entity}_{date}.{ext}
//! import   file ──► import_records::<T> ──► insert_many (one transaction)
//! backup   snapshot ──► pos_backup_{date}.json
//! restore  file ──► parse_backup ──► confirm ──► restore (one transaction)
//! clear    confirm ──► clear_all (one transaction)
//! ```
//!
//! Restore and clear invalidate anything the session holds about the old
//! data, so both also empty the cart and forget the last sale.

use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use serde::Serialize;
use tracing::{debug, info};

use tally_core::export::{
    backup_filename, backup_to_json, export_filename, import_records, parse_backup, to_csv,
    to_json, ExportFormat,
};
use tally_core::format::{file_date, DateStyle};
use tally_core::{CoreError, DataKind};

use super::{cancelled, local_date, write_file, Context};
use crate::cli::DataCommand;
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: DataCommand) -> Result<String, ApiError> {
    match command {
        DataCommand::Export {
            entity,
            format,
            dir,
        } => export(ctx, entity, format, dir).await,
        DataCommand::Import { entity, file } => import(ctx, entity, &file).await,
        DataCommand::Backup { dir } => backup(ctx, dir).await,
        DataCommand::Restore { file } => restore(ctx, &file).await,
        DataCommand::Clear => clear(ctx).await,
    }
}

async fn export(
    ctx: &mut Context<'_>,
    entity: DataKind,
    format: ExportFormat,
    dir: Option<PathBuf>,
) -> Result<String, ApiError> {
    debug!(%entity, format = format.extension(), "data export command");

    let (contents, count) = match entity {
        DataKind::Products => encode(&ctx.db.products().list_all().await?, format)?,
        DataKind::Customers => encode(&ctx.db.customers().list_all().await?, format)?,
        DataKind::Sales => encode(&ctx.db.sales().list_all().await?, format)?,
        DataKind::Categories => encode(&ctx.db.categories().list_all().await?, format)?,
    };

    let name = export_filename(entity.as_str(), &file_date(&Local::now()), format);
    let path = write_file(&ctx.output_dir(dir), &name, &contents)?;
    info!(%entity, count, path = %path.display(), "Data exported");

    Ok(view::alert(
        Tone::Success,
        format!("Exported {} {} to {}", count, entity, path.display()),
    ))
}

/// Refuses empty collections in both formats.
fn encode<T: Serialize>(records: &[T], format: ExportFormat) -> Result<(String, usize), CoreError> {
    if records.is_empty() {
        return Err(CoreError::NothingToExport);
    }
    let contents = match format {
        ExportFormat::Json => to_json(records)?,
        ExportFormat::Csv => to_csv(records)?,
    };
    Ok((contents, records.len()))
}

async fn import(ctx: &mut Context<'_>, entity: DataKind, file: &Path) -> Result<String, ApiError> {
    let text = std::fs::read_to_string(file)?;
    let format = ExportFormat::from_path(&file.to_string_lossy());
    let now = Utc::now();
    debug!(%entity, file = %file.display(), "data import command");

    let count = match entity {
        DataKind::Products => {
            ctx.db
                .products()
                .insert_many(&import_records(&text, format, now)?)
                .await?
        }
        DataKind::Customers => {
            ctx.db
                .customers()
                .insert_many(&import_records(&text, format, now)?)
                .await?
        }
        DataKind::Sales => {
            ctx.db
                .sales()
                .insert_many(&import_records(&text, format, now)?)
                .await?
        }
        DataKind::Categories => {
            ctx.db
                .categories()
                .insert_many(&import_records(&text, format, now)?)
                .await?
        }
    };

    info!(%entity, count, "Data imported");
    Ok(view::alert(
        Tone::Success,
        format!("Imported {} {}", count, entity),
    ))
}

async fn backup(ctx: &mut Context<'_>, dir: Option<PathBuf>) -> Result<String, ApiError> {
    let snapshot = ctx.db.backup().snapshot(Utc::now()).await?;
    let json = backup_to_json(&snapshot)?;

    let name = backup_filename(&file_date(&Local::now()));
    let path = write_file(&ctx.output_dir(dir), &name, &json)?;
    info!(path = %path.display(), "Backup written");

    Ok(view::sections(&[
        view::alert(
            Tone::Success,
            format!("Backup saved to {}", path.display()),
        ),
        view::details(&[
            ("Products", snapshot.products.len().to_string()),
            ("Customers", snapshot.customers.len().to_string()),
            ("Sales", snapshot.sales.len().to_string()),
            ("Categories", snapshot.categories.len().to_string()),
        ]),
    ]))
}

async fn restore(ctx: &mut Context<'_>, file: &Path) -> Result<String, ApiError> {
    let text = std::fs::read_to_string(file)?;
    let backup = parse_backup(&text)?;

    let question = format!(
        "Replace all data with the backup from {}?",
        local_date(&backup.export_date, DateStyle::DateTime)
    );
    if !ctx.confirm(&question) {
        return Ok(cancelled());
    }

    let summary = ctx.db.backup().restore(&backup).await?;
    forget_session_data(ctx);

    Ok(view::sections(&[
        view::alert(Tone::Success, "Backup restored"),
        view::details(&[
            ("Products", summary.products.to_string()),
            ("Customers", summary.customers.to_string()),
            ("Sales", summary.sales.to_string()),
            ("Categories", summary.categories.to_string()),
        ]),
    ]))
}

async fn clear(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    if !ctx.confirm("Delete ALL products, customers, sales and categories? This cannot be undone.") {
        return Ok(cancelled());
    }

    ctx.db.backup().clear_all().await?;
    forget_session_data(ctx);

    Ok(view::alert(Tone::Warning, "All data cleared"))
}

fn forget_session_data(ctx: &mut Context<'_>) {
    ctx.session.cart.clear();
    ctx.session.last_sale = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::error::ErrorCode;
    use crate::prompt::AutoConfirm;
    use tally_core::{Cart, PaymentMethod};

    fn only_file(dir: &Path) -> PathBuf {
        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);
        entries.remove(0)
    }

    #[tokio::test]
    async fn test_csv_export_then_import() {
        let mut h = Harness::new().await;
        h.product("Tea, green", 1000, 5).await;
        h.product("Rice", 900, 12).await;
        let dir = tempfile::tempdir().unwrap();

        handle(
            &mut h.ctx(),
            DataCommand::Export {
                entity: DataKind::Products,
                format: ExportFormat::Csv,
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap();

        let file = only_file(dir.path());
        assert!(file.to_string_lossy().ends_with(".csv"));

        let out = handle(
            &mut h.ctx(),
            DataCommand::Import {
                entity: DataKind::Products,
                file,
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Imported 2 products"));

        let products = h.db.products().list_all().await.unwrap();
        assert_eq!(products.len(), 4);
        assert_eq!(products.iter().filter(|p| p.name == "Tea, green").count(), 2);
    }

    #[tokio::test]
    async fn test_export_empty_collection_refused() {
        let mut h = Harness::new().await;
        let dir = tempfile::tempdir().unwrap();

        let err = handle(
            &mut h.ctx(),
            DataCommand::Export {
                entity: DataKind::Customers,
                format: ExportFormat::Json,
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_malformed_import_writes_nothing() {
        let mut h = Harness::new().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("customers.json");
        std::fs::write(&file, r#"{"name": "not a list"}"#).unwrap();

        let err = handle(
            &mut h.ctx(),
            DataCommand::Import {
                entity: DataKind::Customers,
                file,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(h.db.customers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_backup_restore_round() {
        let mut h = Harness::new().await;
        let tea = h.product("Tea", 1000, 10).await;
        let mut cart = Cart::new();
        cart.add_item(&tea).unwrap();
        h.db.sales()
            .commit(&cart.to_sale(PaymentMethod::Cash, Utc::now()).unwrap())
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        handle(
            &mut h.ctx(),
            DataCommand::Backup {
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap();
        let file = only_file(dir.path());

        handle(&mut h.ctx(), DataCommand::Clear).await.unwrap();
        assert_eq!(h.db.products().count().await.unwrap(), 0);

        h.session.cart.add_item(&tea).unwrap();
        h.session.last_sale = Some(1);

        let out = handle(&mut h.ctx(), DataCommand::Restore { file })
            .await
            .unwrap();
        assert!(out.contains("Backup restored"));

        let restored = h.db.sales().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(restored.total_cents, 1100);
        let stored = h.db.products().get_by_id(tea.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, tally_core::Quantity::from_units(9));
        assert!(h.session.cart.is_empty());
        assert_eq!(h.session.last_sale, None);
    }

    #[tokio::test]
    async fn test_clear_declined() {
        let mut h = Harness::new().await;
        h.product("Tea", 1000, 10).await;
        h.prompt = AutoConfirm(false);

        let out = handle(&mut h.ctx(), DataCommand::Clear).await.unwrap();
        assert_eq!(out, cancelled());
        assert_eq!(h.db.products().count().await.unwrap(), 1);
    }
}
