//! Local display preferences (theme, language, currency).

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: String,
    pub language: String,
    pub currency: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            language: "zh-CN".to_string(),
            currency: "CNY".to_string(),
        }
    }
}

/// Partial preference update; unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub theme: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
}

/// Shared handle to the current preferences.
#[derive(Clone, Default)]
pub struct PreferenceStore {
    inner: Arc<RwLock<Preferences>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Preferences {
        self.inner.read().clone()
    }

    /// Merge an update field-wise into the current preferences.
    pub fn update(&self, update: PreferencesUpdate) {
        let mut prefs = self.inner.write();
        if let Some(theme) = update.theme {
            prefs.theme = theme;
        }
        if let Some(language) = update.language {
            prefs.language = language;
        }
        if let Some(currency) = update.currency {
            prefs.currency = currency;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_defaults() {
        let store = PreferenceStore::new();
        let prefs = store.get();
        assert_eq!(prefs.theme, "light");
        assert_eq!(prefs.language, "zh-CN");
        assert_eq!(prefs.currency, "CNY");
    }

    #[test]
    fn partial_update_leaves_other_fields_untouched() {
        let store = PreferenceStore::new();
        store.update(PreferencesUpdate {
            theme: Some("dark".to_string()),
            ..Default::default()
        });

        let prefs = store.get();
        assert_eq!(prefs.theme, "dark");
        assert_eq!(prefs.language, "zh-CN");
        assert_eq!(prefs.currency, "CNY");
    }

    #[test]
    fn clones_share_state() {
        let store = PreferenceStore::new();
        let other = store.clone();
        store.update(PreferencesUpdate {
            currency: Some("USD".to_string()),
            ..Default::default()
        });
        assert_eq!(other.get().currency, "USD");
    }
}
