//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treemenu/treemenu.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `TREEMENU_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, MenuSettings};
use crate::domain::{LabelRules, RootPatch, LANDING_LEVEL};

/// Raw label config for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLabelConfig {
    pub max_len: Option<usize>,
    pub ellipsis: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_url: Option<String>,
    pub root_title: Option<String>,
    pub landing_level: Option<String>,
    #[serde(default)]
    pub label: RawLabelConfig,
}

/// Unified configuration for treemenu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Url of the synthetic root node (default: "/")
    pub root_url: String,
    /// Title written into the root record (default: "Portfolio")
    pub root_title: String,
    /// Sub-level whose selection matches every node on it (default: "portfolio")
    pub landing_level: String,
    /// Label shortening
    pub label: LabelRules,
}

impl Default for Settings {
    fn default() -> Self {
        let root = RootPatch::default();
        Self {
            root_url: root.url,
            root_title: root.title,
            landing_level: LANDING_LEVEL.into(),
            label: LabelRules::default(),
        }
    }
}

/// Get the XDG config directory for treemenu.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treemenu").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treemenu.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Menu behaviour derived from these settings.
    pub fn menu(&self) -> MenuSettings {
        MenuSettings {
            root: RootPatch {
                url: self.root_url.clone(),
                title: self.root_title.clone(),
            },
            label: self.label.clone(),
            landing_level: self.landing_level.clone(),
        }
    }

    /// Overlay wins where it specifies a value, otherwise keep self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_url: overlay
                .root_url
                .clone()
                .unwrap_or_else(|| self.root_url.clone()),
            root_title: overlay
                .root_title
                .clone()
                .unwrap_or_else(|| self.root_title.clone()),
            landing_level: overlay
                .landing_level
                .clone()
                .unwrap_or_else(|| self.landing_level.clone()),
            label: LabelRules {
                max_len: overlay.label.max_len.unwrap_or(self.label.max_len),
                ellipsis: overlay
                    .label
                    .ellipsis
                    .clone()
                    .unwrap_or_else(|| self.label.ellipsis.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line
    ///
    /// A missing global file is skipped; a missing local file is an error.
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        let global = global_config_path().filter(|path| path.exists());
        Self::load_from(global.as_deref(), local)
    }

    /// Same as [`Settings::load`] with an explicit global file.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            debug!("global config: {}", global_path.display());
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        // 3. Local config
        if let Some(local_path) = local {
            debug!("local config: {}", local_path.display());
            let raw = load_raw_settings(local_path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Apply TREEMENU_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREEMENU")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_url") {
            settings.root_url = val;
        }
        if let Ok(val) = config.get_string("root_title") {
            settings.root_title = val;
        }
        if let Ok(val) = config.get_string("landing_level") {
            settings.landing_level = val;
        }
        if let Ok(val) = config.get_int("label.max_len") {
            settings.label.max_len = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("TREEMENU_LABEL__MAX_LEN must not be negative: {}", val),
            })?;
        }
        if let Ok(val) = config.get_string("label.ellipsis") {
            settings.label.ellipsis = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treemenu configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treemenu/treemenu.toml
#   Local:  file passed with --config
#   Env:    TREEMENU_* environment variables (e.g. TREEMENU_LABEL__MAX_LEN=40)

# Url of the synthetic root node
# root_url = "/"

# Title shown for the root node
# root_title = "Portfolio"

# Selecting this sub-level highlights every node on it
# landing_level = "portfolio"

[label]
# Longest label shown unshortened (characters)
# max_len = 30

# Appended to shortened labels
# ellipsis = "..."
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_building_menu_settings_then_matches_menu_defaults() {
        assert_eq!(Settings::default().menu(), MenuSettings::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let overlay = RawSettings {
            root_title: Some("Work".into()),
            label: RawLabelConfig {
                max_len: Some(12),
                ellipsis: None,
            },
            ..RawSettings::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.root_title, "Work");
        assert_eq!(merged.root_url, "/");
        assert_eq!(merged.label.max_len, 12);
        assert_eq!(merged.label.ellipsis, "...");
    }

    #[test]
    fn given_template_when_parsing_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.root_url.is_none());
    }

    #[test]
    fn given_settings_when_serializing_then_round_trips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
