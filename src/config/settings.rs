//! TOML-based configuration for querycanvas.
//!
//! Example configuration:
//! ```toml
//! [compile]
//! totals = true
//! default_join_kind = "LEFT"
//!
//! [render]
//! where_composition = "and"
//! pretty = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::relationship::JoinKind;
use crate::sql::RenderOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "QUERYCANVAS_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "querycanvas.toml";

/// Errors loading a settings file. Each carries the offending path.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub compile: CompileSettings,
    pub render: RenderOptions,
}

/// Defaults applied when compiling a canvas.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Start with the totals row shown
    pub totals: bool,
    /// Kind given to relationships that do not name one
    pub default_join_kind: JoinKind,
}

impl Settings {
    /// Read settings from a TOML file. Missing tables and keys keep their
    /// defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SettingsError::FileNotFound(path.to_path_buf()),
            _ => SettingsError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;

        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings for the CLI. `$QUERYCANVAS_CONFIG` wins when set and must
    /// point at a readable file; otherwise `querycanvas.toml` in the working
    /// directory is used if present, and the defaults if not.
    pub fn load() -> Result<Self, SettingsError> {
        if let Some(path) = env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }

        Ok(Self::default())
    }
}
