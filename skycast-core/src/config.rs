use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{condition::IconStyle, provider::GeocoderId};

/// Configuration for a single geocoder (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default geocoder id, e.g. "opencage" or "open-meteo".
    pub default_geocoder: Option<String>,

    /// Optional icon style, "image" or "emoji".
    pub icons: Option<String>,

    /// Example TOML:
    /// [providers.opencage]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Return the default geocoder as a strongly-typed GeocoderId, if one is set.
    pub fn default_geocoder_id(&self) -> Result<Option<GeocoderId>> {
        self.default_geocoder.as_deref().map(GeocoderId::try_from).transpose()
    }

    pub fn set_default_geocoder(&mut self, id: GeocoderId) {
        self.default_geocoder = Some(id.as_str().to_string());
    }

    pub fn icon_style(&self) -> Result<IconStyle> {
        match self.icons.as_deref() {
            Some(s) => IconStyle::try_from(s),
            None => Ok(IconStyle::default()),
        }
    }

    pub fn set_icon_style(&mut self, style: IconStyle) {
        self.icons = Some(style.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a geocoder API key and make it the default if none is set yet.
    pub fn upsert_provider_api_key(&mut self, id: GeocoderId, api_key: String) {
        self.providers.insert(id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_geocoder.is_none() {
            self.default_geocoder = Some(id.to_string());
        }
    }

    /// Returns API key for a geocoder, if present.
    pub fn provider_api_key(&self, id: GeocoderId) -> Option<&str> {
        self.providers.get(id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    /// Whether the geocoder can be constructed from this config.
    pub fn is_geocoder_configured(&self, id: GeocoderId) -> bool {
        !id.requires_api_key() || self.provider_api_key(id).is_some()
    }
}
