//! Loading `config.toml` for the host.

use anyhow::{Context, Result};
use bionet_core::AppConfig;
use std::path::Path;

/// Reads and validates the config file.
///
/// A missing file yields the defaults and writes them to `path` so the user
/// has something to edit. A file that fails to parse or validate is reported
/// and the defaults are used instead.
pub fn load_config<P: AsRef<Path>>(path: P) -> AppConfig {
    let path = path.as_ref();
    match read_config(path) {
        Ok(Some(config)) => return config,
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
            return AppConfig::default();
        }
    }

    let default = AppConfig::default();
    if let Err(e) = write_default(path, &default) {
        tracing::warn!(path = %path.display(), error = %e, "Could not write default config");
    }
    default
}

/// `Ok(None)` when the file does not exist.
pub fn read_config(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config =
        AppConfig::from_toml(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config))
}

fn write_default(path: &Path, config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string(config).context("serializing default config")?;
    std::fs::write(path, toml_str).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote default config");
    Ok(())
}
