//! # Settings Commands
//!
//! Each section command edits a copy of the cached settings, validates it,
//! saves it and only then swaps it into the cache. A rejected edit leaves
//! both the store and the cache untouched.

use tracing::info;

use tally_core::format::DateStyle;
use tally_core::{Settings, Theme};

use super::{local_date, Context};
use crate::cli::SettingsCommand;
use crate::error::ApiError;
use crate::view::{self, Tone};

pub async fn handle(ctx: &mut Context<'_>, command: SettingsCommand) -> Result<String, ApiError> {
    match command {
        SettingsCommand::Show => Ok(show(&ctx.settings.get())),
        SettingsCommand::Store {
            name,
            address,
            phone,
            email,
            logo,
        } => {
            update(ctx, "Store", |s| {
                set(&mut s.store_name, name);
                set(&mut s.store_address, address);
                set(&mut s.store_phone, phone);
                set(&mut s.store_email, email);
                set(&mut s.store_logo, logo);
            })
            .await
        }
        SettingsCommand::Tax {
            enabled,
            name,
            rate,
        } => {
            update(ctx, "Tax", |s| {
                set(&mut s.tax_enabled, enabled);
                set(&mut s.tax_name, name);
                set(&mut s.tax_rate_bps, rate.map(|r| r.bps()));
            })
            .await
        }
        SettingsCommand::Receipt {
            header,
            footer,
            template,
        } => {
            update(ctx, "Receipt", |s| {
                set(&mut s.receipt_header, header);
                set(&mut s.receipt_footer, footer);
                set(&mut s.default_receipt_template, template);
            })
            .await
        }
        SettingsCommand::General {
            currency_symbol,
            currency_code,
            decimal_places,
            low_stock,
            language,
            theme,
        } => {
            update(ctx, "General", |s| {
                set(&mut s.currency_symbol, currency_symbol);
                set(&mut s.currency_code, currency_code);
                set(&mut s.decimal_places, decimal_places);
                set(&mut s.low_stock_threshold, low_stock);
                set(&mut s.language, language);
                set(&mut s.theme, theme);
            })
            .await
        }
    }
}

/// Flips light/dark and persists it.
pub async fn toggle_theme(ctx: &mut Context<'_>) -> Result<String, ApiError> {
    let mut theme = Theme::default();
    update(ctx, "Theme", |s| {
        s.theme = s.theme.toggled();
        theme = s.theme;
    })
    .await?;
    Ok(view::alert(Tone::Success, format!("Theme set to {}", theme)))
}

async fn update(
    ctx: &mut Context<'_>,
    section: &str,
    edit: impl FnOnce(&mut Settings),
) -> Result<String, ApiError> {
    let mut settings = ctx.settings.get();
    edit(&mut settings);
    settings.validate()?;

    let saved = ctx.db.settings().save(&settings).await?;
    ctx.settings.replace(saved.clone());
    info!(section, store = %saved.store_name, "Settings saved");

    Ok(view::sections(&[
        view::alert(Tone::Success, format!("{} settings saved", section)),
        show(&saved),
    ]))
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn show(s: &Settings) -> String {
    let or_dash = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
    let yes_no = |b: bool| if b { "yes" } else { "no" }.to_string();

    view::sections(&[
        view::heading("Store"),
        view::details(&[
            ("Name", s.store_name.clone()),
            ("Address", or_dash(&s.store_address)),
            ("Phone", or_dash(&s.store_phone)),
            ("Email", or_dash(&s.store_email)),
            ("Logo", or_dash(&s.store_logo)),
        ]),
        view::heading("Tax"),
        view::details(&[
            ("Enabled", yes_no(s.tax_enabled)),
            ("Name", s.tax_name.clone()),
            ("Rate", format!("{}%", s.tax_rate())),
        ]),
        view::heading("Receipt"),
        view::details(&[
            ("Header", or_dash(&s.receipt_header)),
            ("Footer", or_dash(&s.receipt_footer)),
            (
                "Template",
                format!(
                    "{} ({})",
                    s.default_receipt_template.name(),
                    s.default_receipt_template.key()
                ),
            ),
        ]),
        view::heading("General"),
        view::details(&[
            ("Currency", format!("{} {}", s.currency_symbol, s.currency_code)),
            ("Decimal places", s.decimal_places.to_string()),
            ("Low stock", s.low_stock_threshold.to_string()),
            ("Language", s.language.clone()),
            ("Theme", s.theme.to_string()),
            (
                "Last saved",
                s.updated_at
                    .map(|d| local_date(&d, DateStyle::DateTime))
                    .unwrap_or_else(|| "never".to_string()),
            ),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::error::ErrorCode;
    use tally_core::{ReceiptTemplate, TaxRate};

    #[tokio::test]
    async fn test_tax_update_persists() {
        let mut h = Harness::new().await;

        let out = handle(
            &mut h.ctx(),
            SettingsCommand::Tax {
                enabled: Some(true),
                name: Some("VAT".into()),
                rate: Some(TaxRate::from_bps(750)),
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Tax settings saved"));
        assert!(out.contains("7.5%"));

        assert_eq!(h.settings().tax_name, "VAT");
        let stored = h.db.settings().load().await.unwrap().unwrap();
        assert_eq!(stored.tax_rate_bps, 750);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_invalid_edit_changes_nothing() {
        let mut h = Harness::new().await;
        let before = h.settings();

        let err = handle(
            &mut h.ctx(),
            SettingsCommand::Store {
                name: Some("  ".into()),
                address: None,
                phone: None,
                email: None,
                logo: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(h.settings(), before);

        let err = handle(
            &mut h.ctx(),
            SettingsCommand::General {
                currency_symbol: None,
                currency_code: None,
                decimal_places: Some(7),
                low_stock: None,
                language: None,
                theme: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(h.settings().decimal_places, 2);
    }

    #[tokio::test]
    async fn test_default_template() {
        let mut h = Harness::new().await;
        handle(
            &mut h.ctx(),
            SettingsCommand::Receipt {
                header: None,
                footer: Some("See you soon".into()),
                template: Some(ReceiptTemplate::A4Formal),
            },
        )
        .await
        .unwrap();

        let settings = h.settings();
        assert_eq!(settings.default_receipt_template, ReceiptTemplate::A4Formal);
        assert_eq!(settings.receipt_footer, "See you soon");
    }

    #[tokio::test]
    async fn test_toggle_theme_twice() {
        let mut h = Harness::new().await;
        let out = toggle_theme(&mut h.ctx()).await.unwrap();
        assert!(out.contains("Theme set to dark"));
        assert_eq!(h.db.settings().load().await.unwrap().unwrap().theme, Theme::Dark);

        toggle_theme(&mut h.ctx()).await.unwrap();
        assert_eq!(h.settings().theme, Theme::Light);
    }
}
