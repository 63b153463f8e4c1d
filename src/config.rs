use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};
use crate::render::DotRenderer;

const APP_DIR: &str = "route-tracker";

/// User settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where game files live. Falls back to the XDG data directory.
    pub data_dir: Option<PathBuf>,
    /// Command used to open a rendered image.
    pub viewer: Option<String>,
    /// Graphviz layout program.
    pub dot_command: String,
    pub image_format: String,
    /// Redraw the image after every change, like `show` does.
    pub auto_render: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            viewer: None,
            dot_command: "dot".into(),
            image_format: "png".into(),
            auto_render: false,
        }
    }
}

impl Config {
    /// Read the config at `path`. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Config> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(RouteError::Config(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };
        toml::from_str(&text)
            .map_err(|e| RouteError::Config(format!("invalid {}: {e}", path.display())))
    }

    /// Data directory: explicit override, then the config file, then the
    /// XDG default.
    pub fn resolve_data_dir(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = flag {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        default_data_dir()
            .ok_or_else(|| RouteError::Config("cannot locate a data directory; set HOME or pass --data-dir".into()))
    }

    pub fn renderer(&self) -> DotRenderer {
        DotRenderer {
            command: self.dot_command.clone(),
            format: self.image_format.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Base directories
// ---------------------------------------------------------------------------

fn base_dir(xdg_var: &str, home_fallback: &str) -> Option<PathBuf> {
    std::env::var_os(xdg_var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(home_fallback)))
        .map(|p| p.join(APP_DIR))
}

/// `$XDG_DATA_HOME/route-tracker`, else `~/.local/share/route-tracker`.
pub fn default_data_dir() -> Option<PathBuf> {
    base_dir("XDG_DATA_HOME", ".local/share")
}

/// `$XDG_CONFIG_HOME/route-tracker/config.toml`, else under `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    base_dir("XDG_CONFIG_HOME", ".config").map(|dir| dir.join("config.toml"))
}
