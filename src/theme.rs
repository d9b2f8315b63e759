//! Light/dark theme preference and its persistence.

use crate::models::Theme;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Key the theme is stored under.
pub const THEME_KEY: &str = "theme";

/// Durable string key-value storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept in a small TOML file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring malformed preferences file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self { path, values }
    }

    /// Get the default preferences file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("coindeck").join("preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let content =
            toml::to_string(&self.values).context("Failed to serialize preferences")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences file: {}", self.path.display()))?;

        Ok(())
    }
}

/// Volatile store, used when no config directory exists and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Current theme plus the store it is persisted in.
pub struct ThemeManager {
    theme: Theme,
    store: Box<dyn PreferenceStore>,
}

impl ThemeManager {
    /// Read the persisted theme. Absent means light.
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let theme = Theme::from_stored(store.get(THEME_KEY).as_deref());
        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Icon for the toggle control.
    pub fn icon(&self) -> &'static str {
        self.theme.icon()
    }

    /// Flip the theme and persist it.
    ///
    /// The in-memory theme flips even when the write fails.
    pub fn toggle(&mut self) -> Result<Theme> {
        self.theme = self.theme.toggle();
        self.store.set(THEME_KEY, self.theme.as_str())?;
        Ok(self.theme)
    }

    /// Value currently in the store.
    pub fn stored(&self) -> Option<String> {
        self.store.get(THEME_KEY)
    }
}
