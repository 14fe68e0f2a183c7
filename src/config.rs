use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const APP_DIR: &str = "wayland-color-picker";
/// Directory earlier releases kept `history.json` in.
pub const LEGACY_APP_DIR: &str = "color-picker";
const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which part of the fallback chain to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Portal, then the compositor tool, then grim + slurp.
    #[default]
    Auto,
    Portal,
    Hyprland,
    Capture,
}

/// Executable names for the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolNames {
    pub hyprpicker: String,
    pub slurp: String,
    pub grim: String,
    pub convert: String,
    pub magick: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            hyprpicker: "hyprpicker".into(),
            slurp: "slurp".into(),
            grim: "grim".into(),
            convert: "convert".into(),
            magick: "magick".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub autocopy: bool,
    pub history_limit: usize,
    pub portal_timeout_secs: u64,
    pub backend: BackendChoice,
    pub tools: ToolNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autocopy: true,
            history_limit: 20,
            portal_timeout_secs: 120,
            backend: BackendChoice::Auto,
            tools: ToolNames::default(),
        }
    }
}

impl Config {
    pub fn portal_timeout(&self) -> Duration {
        Duration::from_secs(self.portal_timeout_secs)
    }

    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
fn base_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_default()
}

/// `$XDG_CONFIG_HOME/wayland-color-picker`.
pub fn config_dir() -> PathBuf {
    base_config_dir().join(APP_DIR)
}

/// Where the config and history files live for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config: PathBuf,
    /// Always written here, next to the config file.
    pub history: PathBuf,
    legacy_history: Option<PathBuf>,
}

impl Paths {
    /// Default locations, or the directory of `config_override` when given.
    /// Only the default layout falls back to the old `color-picker` history.
    pub fn resolve(config_override: Option<PathBuf>) -> Self {
        match config_override {
            Some(config) => Self::for_config(config),
            None => Self {
                legacy_history: Some(base_config_dir().join(LEGACY_APP_DIR).join(HISTORY_FILE)),
                ..Self::for_config(config_dir().join(CONFIG_FILE))
            },
        }
    }

    pub fn for_config(config: PathBuf) -> Self {
        let history = config
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(HISTORY_FILE);
        Self {
            config,
            history,
            legacy_history: None,
        }
    }

    pub fn with_legacy_history(mut self, legacy: PathBuf) -> Self {
        self.legacy_history = Some(legacy);
        self
    }

    /// The history file to load: the current one once it exists, else a
    /// history left by earlier releases.
    pub fn history_to_read(&self) -> &Path {
        match &self.legacy_history {
            Some(legacy) if !self.history.exists() && legacy.exists() => {
                tracing::info!(path = %legacy.display(), "reading legacy history");
                legacy
            }
            _ => &self.history,
        }
    }
}
