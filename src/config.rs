use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};

use crate::aggregate::DEFAULT_RECENT_LIMIT;
use crate::display::DisplayStyle;
use crate::error::{Error, Result};
use crate::utils;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the database location under the data root.
    pub database_path: Option<PathBuf>,
    /// How many shows the shows page lists.
    pub recent_shows_limit: usize,
    pub display_style: DisplayStyle,
    /// `tracing` filter directive, e.g. `show_directory=debug`.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            recent_shows_limit: DEFAULT_RECENT_LIMIT,
            display_style: DisplayStyle::default(),
            log_filter: None,
        }
    }
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(utils::database_path)
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::load_from(utils::config_path())
    }

    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load_from(path: PathBuf) -> Self {
        let data = match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring config at {}: {err}", path.display());
                AppConfig::default()
            }
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn read(&self) -> AppConfig {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| Error::Config("config mutex poisoned".to_string()))?;
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    utils::ensure_parent(path);
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::load_from(dir.path().join("config.json"));
        let config = store.read();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.recent_shows_limit, 10);
        assert_eq!(config.display_style, DisplayStyle::Medium);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"display_style": "full", "database_path": "/tmp/x.sqlite"}"#)
            .expect("write config");
        let config = ConfigStore::load_from(path).read();
        assert_eq!(config.display_style, DisplayStyle::Full);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(config.recent_shows_limit, 10);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write config");
        assert_eq!(ConfigStore::load_from(path).read(), AppConfig::default());
    }

    #[test]
    fn update_persists_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let store = ConfigStore::load_from(path.clone());
        let updated = store
            .update(|config| config.recent_shows_limit = 25)
            .expect("update");
        assert_eq!(updated.recent_shows_limit, 25);

        let reloaded = ConfigStore::load_from(path).read();
        assert_eq!(reloaded.recent_shows_limit, 25);
    }
}
