//! Configuration module for querycanvas.
//!
//! Handles compile defaults and SQL rendering options.

mod settings;

pub use settings::{CompileSettings, Settings, SettingsError, CONFIG_ENV_VAR, LOCAL_CONFIG_FILE};
