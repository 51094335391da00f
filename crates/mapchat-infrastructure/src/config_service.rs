//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads `MapChatConfig` from the
//! configuration file (~/.config/mapchat/config.toml).

use crate::paths::MapChatPaths;
use mapchat_core::config::MapChatConfig;
use mapchat_core::error::{MapChatError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the configuration.
///
/// A missing file is not an error: it yields the built-in defaults. A file
/// that exists but does not parse is reported by [`load`](Self::load) and
/// replaced by defaults in [`get_config`](Self::get_config).
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit file location; `None` resolves the platform default lazily.
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<MapChatConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the platform default location.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading from `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> MapChatConfig {
        // Check if already cached
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!("[ConfigService] Falling back to defaults: {}", e);
            MapChatConfig::default()
        });

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    /// Reads the configuration file without touching the cache.
    pub fn load(&self) -> Result<MapChatConfig> {
        let path = self.config_path()?;
        Self::load_from(&path)
    }

    /// Writes `config` to the configuration file, creating parent
    /// directories, and refreshes the cache.
    pub fn save(&self, config: &MapChatConfig) -> Result<()> {
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(config)?)?;
        tracing::debug!("[ConfigService] Saved config to {}", path.display());

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(config.clone());
        Ok(())
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => MapChatPaths::config_file().map_err(|e| MapChatError::config(e.to_string())),
        }
    }

    fn load_from(path: &Path) -> Result<MapChatConfig> {
        if !path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                path.display()
            );
            return Ok(MapChatConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!("[ConfigService] Loaded config from {}", path.display());
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
