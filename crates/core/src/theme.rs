//! Night-mode preference stored in `app_prefs`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::prefs;
use crate::error::{ChatError, ChatResult};
use crate::storage::PreferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::System => "system",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Anything other than "light" or "dark" follows the system.
    pub fn from_pref(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for ThemeMode {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ThemeMode::System),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(ChatError::InvalidTheme(other.to_string())),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemePreference {
    store: PreferenceStore,
}

impl ThemePreference {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    pub fn get(&self) -> ChatResult<ThemeMode> {
        let saved = self.store.get_string(prefs::KEY_NIGHT_MODE)?;
        Ok(ThemeMode::from_pref(saved.as_deref()))
    }

    pub fn set(&self, mode: ThemeMode) -> ChatResult<()> {
        self.store.put_string(prefs::KEY_NIGHT_MODE, mode.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    #[test]
    fn test_from_pref() {
        assert_eq!(ThemeMode::from_pref(None), ThemeMode::System);
        assert_eq!(ThemeMode::from_pref(Some("dark")), ThemeMode::Dark);
        assert_eq!(ThemeMode::from_pref(Some("light")), ThemeMode::Light);
        assert_eq!(ThemeMode::from_pref(Some("sepia")), ThemeMode::System);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!("Dark".parse::<ThemeMode>(), Err(ChatError::InvalidTheme(_))));
    }

    #[test]
    fn test_preference_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        let theme = ThemePreference::new(storage.store(prefs::APP_PREFS_STORE));

        assert_eq!(theme.get().unwrap(), ThemeMode::System);
        theme.set(ThemeMode::Dark).unwrap();
        assert_eq!(theme.get().unwrap(), ThemeMode::Dark);

        let raw = storage.store(prefs::APP_PREFS_STORE).get_string("night_mode").unwrap();
        assert_eq!(raw.as_deref(), Some("dark"));
    }
}
