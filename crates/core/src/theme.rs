//! Theme preference reader
//!
//! The stored preference is read once at startup into a [`ThemeConfig`],
//! which is then handed to the root component.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::{Error, Result};

/// Storage key holding the preference
pub const THEME_KEY: &str = "theme";

/// Theme the user asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl FromStr for ThemePreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(Error::InvalidInput(format!(
                "Unknown theme preference: {}",
                other
            ))),
        }
    }
}

/// Theme actually applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Class applied to the document root
    pub fn class(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl ThemePreference {
    pub fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::System if prefers_dark => Theme::Dark,
            Self::System => Theme::Light,
        }
    }
}

/// Read-only key-value preference storage
pub trait PreferenceStorage {
    fn get(&self, key: &str) -> Option<String>;
}

/// Preferences held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    entries: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl PreferenceStorage for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Preferences stored as a flat JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    entries: HashMap<String, String>,
}

impl JsonFilePreferences {
    /// Load the file; a missing file is an empty storage
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };
        Ok(Self { entries })
    }
}

impl PreferenceStorage for JsonFilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Theme settings resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeConfig {
    pub preference: ThemePreference,
    pub theme: Theme,
}

impl ThemeConfig {
    pub fn new(preference: ThemePreference, prefers_dark: bool) -> Self {
        Self {
            preference,
            theme: preference.resolve(prefers_dark),
        }
    }

    /// Read the stored preference and resolve it against the OS signal
    pub fn load(storage: &dyn PreferenceStorage, prefers_dark: bool) -> Self {
        let preference = match storage.get(THEME_KEY) {
            None => ThemePreference::System,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to system", e);
                ThemePreference::System
            }),
        };
        Self::new(preference, prefers_dark)
    }

    pub fn class(&self) -> &'static str {
        self.theme.class()
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::new(ThemePreference::System, false)
    }
}
