//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/jphmind/jphmind.toml`
//! 3. Local config: `<dir>/.jphmind.toml`
//! 4. Environment variables: `JPHMIND_*` prefix (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_HISTORY_CAPACITY;

/// Presentation defaults, resolved only when a node is drawn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Color for nodes without an explicit color
    pub color: String,
    /// Font size for nodes without an explicit size
    pub font_size: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: "#4a90e2".into(),
            font_size: 14,
        }
    }
}

/// Raw display config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub color: Option<String>,
    pub font_size: Option<u32>,
}

impl DisplayConfig {
    fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            color: overlay.color.clone().unwrap_or_else(|| self.color.clone()),
            font_size: overlay.font_size.unwrap_or(self.font_size),
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub history_capacity: Option<usize>,
    pub root_label: Option<String>,
    pub child_label: Option<String>,
    pub sibling_label: Option<String>,
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub display: RawDisplayConfig,
}

/// Unified configuration for jphmind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Number of undo snapshots kept (default: 50)
    pub history_capacity: usize,
    /// Label of a fresh map's root
    pub root_label: String,
    /// Label used when a child is added with blank text
    pub child_label: String,
    /// Label used when a sibling is added with blank text
    pub sibling_label: String,
    /// Where mindmaps are saved when no path is given (default: ~/.jphmind)
    pub data_dir: PathBuf,
    /// Presentation defaults
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            root_label: "Central Idea".into(),
            child_label: "New Child".into(),
            sibling_label: "New Sibling".into(),
            data_dir: default_data_dir(),
            display: DisplayConfig::default(),
        }
    }
}

/// Get the default data directory (~/.jphmind).
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".jphmind"))
        .unwrap_or_else(|| PathBuf::from("~/.jphmind"))
}

/// Get the XDG config directory for jphmind.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "jphmind").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("jphmind.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".jphmind.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.data_dir.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.data_dir = PathBuf::from(expanded.into_owned());
        }
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            history_capacity: overlay.history_capacity.unwrap_or(self.history_capacity),
            root_label: overlay
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            child_label: overlay
                .child_label
                .clone()
                .unwrap_or_else(|| self.child_label.clone()),
            sibling_label: overlay
                .sibling_label
                .clone()
                .unwrap_or_else(|| self.sibling_label.clone()),
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.jphmind.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/jphmind/jphmind.toml`
    /// 3. Local config: `<local_dir>/.jphmind.toml`
    /// 4. Environment variables: `JPHMIND_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply JPHMIND_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("JPHMIND")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("history_capacity") {
            settings.history_capacity = val;
        }
        if let Ok(val) = config.get_string("root_label") {
            settings.root_label = val;
        }
        if let Ok(val) = config.get_string("child_label") {
            settings.child_label = val;
        }
        if let Ok(val) = config.get_string("sibling_label") {
            settings.sibling_label = val;
        }
        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("display.color") {
            settings.display.color = val;
        }
        if let Ok(val) = config.get::<u32>("display.font_size") {
            settings.display.font_size = val;
        }

        Ok(settings)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be at least 1"));
        }
        for (key, label) in [
            ("root_label", &self.root_label),
            ("child_label", &self.child_label),
            ("sibling_label", &self.sibling_label),
        ] {
            if label.trim().is_empty() {
                return Err(invalid(&format!("{} must not be blank", key)));
            }
        }
        if self.display.font_size == 0 {
            return Err(invalid("display.font_size must be positive"));
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

fn invalid(message: &str) -> ApplicationError {
    ApplicationError::Config {
        message: message.to_string(),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
