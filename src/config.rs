//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rstreemap/rstreemap.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `RSTREEMAP_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::Rect;

/// Unified configuration for rstreemap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Display width in pixels
    pub width: i64,
    /// Display height in pixels, status line included
    pub height: i64,
    /// Height of the status line below the treemap
    pub font_height: i64,
    /// Fraction of the selected leaf's weight added or removed per keypress
    pub resize_step: f64,
    /// Seed for node colors; random when unset
    pub seed: Option<u64>,
    /// Separator between labels for datasets that do not set their own
    pub dataset_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            font_height: 30,
            resize_step: 0.01,
            seed: None,
            dataset_separator: " / ".into(),
        }
    }
}

/// Get the XDG config directory for rstreemap.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstreemap").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstreemap.toml"))
}

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(raw.as_ref()) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/rstreemap/rstreemap.toml`
    /// 3. `config_file`
    /// 4. Environment variables: `RSTREEMAP_*` prefix
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), config_file)
    }

    /// Like `load`, with the global config location given explicitly.
    pub fn load_from(
        global_file: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("width", defaults.width)
            .map_err(config_err)?
            .set_default("height", defaults.height)
            .map_err(config_err)?
            .set_default("font_height", defaults.font_height)
            .map_err(config_err)?
            .set_default("resize_step", defaults.resize_step)
            .map_err(config_err)?
            .set_default("dataset_separator", defaults.dataset_separator.clone())
            .map_err(config_err)?;

        if let Some(global_path) = global_file {
            if global_path.exists() {
                debug!(path = %global_path.display(), "global config");
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(path) = config_file {
            let path = expand_path(path);
            debug!(path = %path.display(), "explicit config");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("RSTREEMAP").try_parsing(true));

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the layout cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ApplicationError::Config {
                message: format!("display must be positive, got {}x{}", self.width, self.height),
            });
        }
        if self.font_height < 0 || self.font_height >= self.height {
            return Err(ApplicationError::Config {
                message: format!(
                    "font_height {} must be in [0, height {})",
                    self.font_height, self.height
                ),
            });
        }
        if !(self.resize_step > 0.0 && self.resize_step <= 1.0) {
            return Err(ApplicationError::Config {
                message: format!("resize_step must be in (0, 1], got {}", self.resize_step),
            });
        }
        Ok(())
    }

    /// Screen area left for the treemap above the status line.
    pub fn treemap_area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height - self.font_height)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rstreemap configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rstreemap/rstreemap.toml
#   File:   --config <FILE>
#   Env:    RSTREEMAP_* environment variables (e.g. RSTREEMAP_WIDTH=800)

# Display size in pixels; the status line takes font_height off the bottom
# width = 1024
# height = 768
# font_height = 30

# Fraction of the selected leaf's weight changed per up/down key
# resize_step = 0.01

# Fixed seed for reproducible colors
# seed = 42

# Label separator for datasets without their own
# dataset_separator = " / "
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
