// Configuration loader
// Loads ~/.vocab-quiz/config.toml (or an explicit path) and applies
// environment overrides for secrets and data locations.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;
use crate::errors;

/// `~/.vocab-quiz/config.toml`, when a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vocab-quiz").join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the default location is
/// tried and built-in defaults are used when it is absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                bail!(errors::file_not_found_error(
                    &path.display().to_string(),
                    "Configuration file"
                ));
            }
            load_config_from(path)?
        }
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_config_from(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// Parse a TOML config file without environment overrides.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!(errors::config_parse_error(&e.to_string())))?;

    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Environment variables win over the file. Empty values are ignored.
fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = var("PONS_API_KEY") {
        config.pons.api_key = Some(key);
    }
    if let Some(key) = var("OPENAI_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(dir) = var("QUIZ_DATA_PATH") {
        config.data.data_dir = PathBuf::from(dir);
    }
    if let Some(workbook) = var("VOCAB_WORKBOOK") {
        config.data.workbook_path = PathBuf::from(workbook);
    }
}
