//! TOML configuration file loading
//!
//! The file is optional. An explicit `--config-file` must exist; otherwise
//! `<config dir>/Wim/wim.toml` is read when present. Values only fill in what
//! the command line left unset.

use crate::app::cli::args::{Args, LOG_FORMATS, LOG_LEVELS};
use crate::core::error_handling::ContextualError;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "Wim";
pub const CONFIG_FILE_NAME: &str = "wim.toml";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {path}")]
    NotFound { path: String },

    #[error("Error reading configuration file {path}: {cause}")]
    Read { path: String, cause: String },

    #[error("Error parsing configuration file {path}: {cause}")]
    Parse { path: String, cause: String },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::NotFound { .. } => Some("Configuration file not found"),
            ConfigError::Parse { .. } => Some("Configuration file is not valid TOML"),
            ConfigError::InvalidValue { message, .. } => Some(message),
            ConfigError::Read { .. } => None,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Read and parse the configuration file, if there is one to read
pub async fn load_config_file(explicit: Option<&Path>) -> ConfigResult<Option<(PathBuf, toml::Table)>> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            })
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;
    let table = parse_config(&path, &contents)?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(Some((path, table)))
}

pub fn parse_config(path: &Path, contents: &str) -> ConfigResult<toml::Table> {
    toml::from_str::<toml::Table>(contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        cause: e.to_string(),
    })
}

impl Args {
    /// Fill unset options from a configuration table
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> ConfigResult<()> {
        if let Some(dirs) = string_list(config, "plugin-dir")? {
            if self.plugin_dirs.is_empty() {
                self.plugin_dirs = dirs.into_iter().map(PathBuf::from).collect();
            }
        }
        if let Some(exclusions) = string_list(config, "exclude-plugin")? {
            if self.plugin_exclusions.is_empty() {
                self.plugin_exclusions = exclusions;
            }
        }
        if let Some(no_builtins) = boolean(config, "no-builtins")? {
            self.no_builtins |= no_builtins;
        }
        if let Some(parallel) = boolean(config, "parallel")? {
            self.parallel |= parallel;
        }
        if let Some(color) = boolean(config, "color")? {
            if self.color_setting().is_none() {
                self.color = color;
                self.no_color = !color;
            }
        }
        if let Some(level) = choice(config, "log-level", &LOG_LEVELS)? {
            self.log_level.get_or_insert(level);
        }
        if let Some(file) = string(config, "log-file")? {
            self.log_file.get_or_insert_with(|| PathBuf::from(file));
        }
        if let Some(format) = choice(config, "log-format", &LOG_FORMATS)? {
            self.log_format.get_or_insert(format);
        }
        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

fn string(config: &toml::Table, key: &str) -> ConfigResult<Option<String>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|text| Some(text.to_string()))
            .ok_or_else(|| invalid(key, format!("expected a string for '{}'", key))),
    }
}

fn boolean(config: &toml::Table, key: &str) -> ConfigResult<Option<bool>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected true or false for '{}'", key))),
    }
}

fn choice(config: &toml::Table, key: &str, allowed: &[&str]) -> ConfigResult<Option<String>> {
    match string(config, key)? {
        Some(value) if !allowed.contains(&value.as_str()) => Err(invalid(
            key,
            format!("'{}' is not one of {}", value, allowed.join(", ")),
        )),
        other => Ok(other),
    }
}

/// A single string or an array of strings
fn string_list(config: &toml::Table, key: &str) -> ConfigResult<Option<Vec<String>>> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };
    if let Some(text) = value.as_str() {
        return Ok(Some(vec![text.to_string()]));
    }
    let items = value
        .as_array()
        .ok_or_else(|| invalid(key, format!("expected a string or list of strings for '{}'", key)))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(key, format!("expected only strings in '{}'", key)))
        })
        .collect::<ConfigResult<Vec<_>>>()
        .map(Some)
}
