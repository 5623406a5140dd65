use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::gesture::ZoomModifier;
use crate::scanner::SortOrder;

const CONFIG_FILE_NAME: &str = "wheelpage.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub font_scale: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 800, height: 600, font_scale: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub zoom_modifier: ZoomModifier,
    /// Pixels scrolled per wheel line
    pub line_px: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { zoom_modifier: ZoomModifier::Ctrl, line_px: 40.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub sort: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub input: InputConfig,
    pub browse: BrowseConfig,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reads `path`; a missing file is created with defaults.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {:?}", path);
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return Self::from_toml_str(&content)
                .with_context(|| format!("parsing {}", path.display()));
        }

        let cfg = Self::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let toml_str = toml::to_string_pretty(&cfg)?;
        fs::write(path, toml_str).with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote default config to {:?}", path);
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            bail!("window size must be positive, got {}x{}", self.window.width, self.window.height);
        }
        if !(self.window.font_scale > 0.0) {
            bail!("font_scale must be positive, got {}", self.window.font_scale);
        }
        if !(self.input.line_px > 0.0) {
            bail!("line_px must be positive, got {}", self.input.line_px);
        }
        Ok(())
    }

    /// Explicit path, else the platform config dir, else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_or_create(path),
            None => match Self::default_path() {
                Some(path) => Self::load_or_create(&path),
                None => {
                    debug!("No config dir found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }
}
