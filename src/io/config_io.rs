use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::model::config::TallyConfig;

/// Error type for reading tally.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub const CONFIG_FILE: &str = "tally.toml";

/// Written by `tally init`
pub const CONFIG_TEMPLATE: &str = r##"# Accounts offered in the Account column
accounts = ["Checking", "Savings", "Cash"]

[ui]
show_key_hints = true
# Two clicks closer than this (milliseconds) count as a double-click
double_click_ms = 400
#
# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# highlight = "#FB4196"
# green = "#44FF88"
# red = "#FF4444"

# --- Categories ---
# Listed in the order they appear in the dropdown. `color` is a theme color
# name or "#RRGGBB"; archived categories stay visible but cannot be picked.

[categories.Home]
color = "blue"
subcategories = ["Rent", "Utilities", "Maintenance"]

[categories.Food]
color = "green"
subcategories = ["Groceries", "Restaurants"]

[categories.Transport]
color = "yellow"
subcategories = ["Fuel", "Public transport"]

[categories.Salary]
color = "cyan"
subcategories = []
"##;

/// Read the config at `path`. A missing file gives the defaults.
pub fn read_config(path: &Path) -> Result<TallyConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(TallyConfig::default());
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write the starter config. Refuses to overwrite an existing file.
pub fn write_template(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::IoError(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        )));
    }
    fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}
