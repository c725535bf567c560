//! CLI command implementations

pub mod check;
pub mod example;
pub mod resolve;
pub mod run;

use anyhow::{Context, Result};
use std::path::Path;
use twinsync_core::{Config, ConfigSource, TomlConfigSource};

/// Load the config file on top of the defaults
fn load_config(path: &Path) -> Result<Config> {
    let defaults = Config::from_config_path(path)
        .with_context(|| format!("Unusable config path {}", path.display()))?;

    TomlConfigSource::new(defaults.config_path())
        .reload(&defaults)
        .with_context(|| format!("Failed to load {}", defaults.config_path().display()))
}
