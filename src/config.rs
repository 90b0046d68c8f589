use crate::catalog::Category;
use crate::format::TextFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dm-sharedpanel";
const CONFIG_FILE: &str = "config.toml";

/// Panel settings, read from `config.toml`. Every field has a default so a
/// partial (or missing) file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub default_format: TextFormat,
    pub default_tab: Category,
    /// How long a toast stays up.
    pub toast_millis: u64,
    pub window_size: [f32; 2],
    pub log_file: PathBuf,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            default_format: TextFormat::Json,
            default_tab: Category::Items,
            toast_millis: 2200,
            window_size: [1100.0, 720.0],
            log_file: PathBuf::from("dm-sharedpanel.log"),
        }
    }
}

impl PanelConfig {
    /// `<config dir>/dm-sharedpanel/config.toml`, e.g. `~/.config/dm-sharedpanel/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads `path`, or the default location when `None`. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&path).with_context(|| format!("reading {path:?}"))?;
        let config: PanelConfig =
            toml::from_str(&contents).with_context(|| format!("parsing {path:?}"))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {parent:?}"))?;
        }
        let text = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text).with_context(|| format!("writing {path:?}"))?;
        Ok(())
    }
}
