//! # Category Commands
//!
//! Deleting a category leaves its products in place; they show `-` as
//! their category until edited.

use tracing::info;

use tally_core::validation::validate_name;
use tally_core::Category;

use super::{cancelled, Context};
use crate::cli::CategoryCommand;
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: CategoryCommand) -> Result<String, ApiError> {
    match command {
        CategoryCommand::List => list(ctx).await,
        CategoryCommand::Add { name } => {
            validate_name(&name)?;
            let category = ctx.db.categories().insert(name.trim()).await?;
            info!(id = category.id, name = %category.name, "Category created");
            Ok(view::alert(
                Tone::Success,
                format!("Category #{} '{}' added", category.id, category.name),
            ))
        }
        CategoryCommand::Rename { id, name } => {
            validate_name(&name)?;
            let category = ctx.db.categories().rename(id, name.trim()).await?;
            info!(id, name = %category.name, "Category renamed");
            Ok(view::alert(
                Tone::Success,
                format!("Category #{} renamed to '{}'", id, category.name),
            ))
        }
        CategoryCommand::Delete { id } => delete(ctx, id).await,
    }
}

async fn list(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    let categories = ctx.db.categories().list_all().await?;
    let products = ctx.db.products().list_all().await?;

    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|c| {
            let count = products
                .iter()
                .filter(|p| p.category_id == Some(c.id))
                .count();
            vec![c.id.to_string(), c.name.clone(), count.to_string()]
        })
        .collect();

    Ok(view::sections(&[
        view::heading(&format!("Categories ({})", categories.len())),
        view::table(&["ID", "Name", "Products"], &rows, "No categories yet"),
    ]))
}

async fn delete(ctx: &mut Context<'_>, id: i64) -> Result<String, ApiError> {
    let category: Category = ctx
        .db
        .categories()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))?;

    if !ctx.confirm(&format!("Delete category '{}'?", category.name)) {
        return Ok(cancelled());
    }

    ctx.db.categories().delete(id).await?;
    info!(id, "Category deleted");
    Ok(view::alert(
        Tone::Success,
        format!("Category '{}' deleted", category.name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_list_counts_products() {
        let mut h = Harness::new().await;
        let categories = h.db.categories().list_all().await.unwrap();
        assert_eq!(categories.len(), 8);

        let mut tea = h.product("Tea", 100, 5).await;
        tea.category_id = Some(categories[1].id);
        h.db.products().update(&tea).await.unwrap();

        let out = handle(&mut h.ctx(), CategoryCommand::List).await.unwrap();
        assert!(out.contains("Categories (8)"));
        let line = out
            .lines()
            .find(|l| l.contains(&categories[1].name))
            .unwrap();
        assert!(line.trim_end().ends_with('1'));
    }

    #[tokio::test]
    async fn test_add_rename_delete() {
        let mut h = Harness::new().await;

        let out = handle(&mut h.ctx(), CategoryCommand::Add { name: " Toys ".into() })
            .await
            .unwrap();
        assert!(out.contains("'Toys' added"));

        let toys = h
            .db
            .categories()
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Toys")
            .unwrap();

        handle(
            &mut h.ctx(),
            CategoryCommand::Rename {
                id: toys.id,
                name: "Games".into(),
            },
        )
        .await
        .unwrap();
        let renamed = h.db.categories().get_by_id(toys.id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "Games");

        handle(&mut h.ctx(), CategoryCommand::Delete { id: toys.id })
            .await
            .unwrap();
        assert!(h.db.categories().get_by_id(toys.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let mut h = Harness::new().await;
        let err = handle(&mut h.ctx(), CategoryCommand::Add { name: "  ".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
