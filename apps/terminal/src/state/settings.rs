//! # Settings Cache
//!
//! A synchronous mirror of the stored settings record. Formatting reads it
//! on every render; only the settings handlers and the theme toggle write
//! it, and always right after the store accepted the same record.

use std::sync::{Arc, PoisonError, RwLock};

use tally_core::Settings;

#[derive(Debug, Clone, Default)]
pub struct SettingsCache {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsCache {
    pub fn new(settings: Settings) -> Self {
        SettingsCache {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// A copy of the current settings.
    pub fn get(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the cached record with what the store just saved.
    pub fn replace(&self, settings: Settings) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Theme;

    #[test]
    fn test_clones_share_the_record() {
        let cache = SettingsCache::new(Settings::default());
        let handle = cache.clone();

        handle.replace(Settings {
            theme: Theme::Dark,
            ..Settings::default()
        });

        assert_eq!(cache.get().theme, Theme::Dark);
    }
}
