//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use cfdi_core::CfdiConfig;
use tracing::debug;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cfdi")
        .join("config.json")
}

/// The config file in use: `--config` if given, else the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration. An explicit path must exist; the default file is
/// optional.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<CfdiConfig> {
    if let Some(path) = explicit {
        return Ok(CfdiConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(CfdiConfig::from_file(&path)?)
    } else {
        Ok(CfdiConfig::default())
    }
}
