//! # Settings Repository
//!
//! The store keeps exactly one settings record, under [`SETTINGS_KEY`],
//! serialized as a JSON document in the `settings` table.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use tally_core::{Settings, SETTINGS_KEY};

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads the settings record, if one was ever saved.
    pub async fn load(&self) -> DbResult<Option<Settings>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Saves the record, stamping `updated_at`.
    ///
    /// ## Returns
    /// The settings as stored.
    pub async fn save(&self, settings: &Settings) -> DbResult<Settings> {
        let now = Utc::now();
        let stored = Settings {
            updated_at: Some(now),
            ..settings.clone()
        };

        debug!(store = %stored.store_name, "Saving settings");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(SETTINGS_KEY)
        .bind(serde_json::to_string(&stored)?)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Returns the stored record, writing the defaults first if there is none.
    pub async fn ensure_defaults(&self) -> DbResult<Settings> {
        if let Some(settings) = self.load().await? {
            return Ok(settings);
        }

        info!("Writing default settings");
        self.save(&Settings::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use pretty_assertions::assert_eq;
    use tally_core::{ReceiptTemplate, Theme};

    #[tokio::test]
    async fn test_defaults_written_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.settings().load().await.unwrap().is_none());

        let first = db.settings().ensure_defaults().await.unwrap();
        assert_eq!(first.store_name, "My Store");
        assert!(first.updated_at.is_some());

        let mut edited = first.clone();
        edited.store_name = "Corner Shop".to_string();
        db.settings().save(&edited).await.unwrap();

        // A second bootstrap keeps the user's edit
        let again = db.settings().ensure_defaults().await.unwrap();
        assert_eq!(again.store_name, "Corner Shop");
    }

    #[tokio::test]
    async fn test_save_round_trips_every_field() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = Settings {
            theme: Theme::Dark,
            default_receipt_template: ReceiptTemplate::A4Formal,
            currency_symbol: "€".to_string(),
            decimal_places: 3,
            ..Settings::default()
        };

        let saved = db.settings().save(&settings).await.unwrap();
        let loaded = db.settings().load().await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.default_receipt_template, ReceiptTemplate::A4Formal);
    }
}
