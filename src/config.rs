// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for locating and loading the
//! application configuration from a data directory.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Config;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Path of the configuration file under a data directory.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load configuration from the data directory.
///
/// Falls back to defaults if the file is missing or malformed.
pub fn load_config(data_dir: &Path) -> Config {
    Config::load_or_default(config_path(data_dir))
}

/// Load and validate configuration from the data directory.
pub fn load_validated(data_dir: &Path) -> Result<Config> {
    let config = load_config(data_dir);
    config.validate()?;
    Ok(config)
}
