// Configuration structs

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use super::constants::*;
use crate::errors;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Workbook and on-disk state locations
    pub data: DataConfig,

    /// PONS dictionary API
    pub pons: PonsConfig,

    /// LLM used for example sentence generation
    pub llm: LlmConfig,

    /// Grammar site used by the word lookup
    pub grammar: GrammarConfig,

    /// Quiz selection behaviour
    pub quiz: QuizConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Directory served under /static (skipped when missing)
    pub static_dir: Option<PathBuf>,
    /// Maximum accepted request body size
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_HTTP_ADDR.to_string(),
            static_dir: Some(PathBuf::from("app/static")),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Spreadsheet with the Verb, Sentences and Noun sheets
    pub workbook_path: PathBuf,
    /// Directory holding quiz_progress.json and pons_cache.db
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl DataConfig {
    pub fn progress_path(&self) -> PathBuf {
        self.data_dir.join(PROGRESS_FILE_NAME)
    }

    pub fn pons_cache_path(&self) -> PathBuf {
        self.data_dir.join(PONS_CACHE_FILE_NAME)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PonsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for PonsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PONS_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    pub base_url: String,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GRAMMAR_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Fixed RNG seed for reproducible quiz order (unset = thread RNG)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                format!("Invalid bind address: '{}'", self.server.bind_address),
                "Bind address should be in format 'IP:PORT'\n\
                 Examples:\n  \
                 • 127.0.0.1:8000\n  \
                 • 0.0.0.0:8080"
            ));
        }

        if self.server.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!(
                "llm.temperature ({}) must be between 0.0 and 2.0",
                self.llm.temperature
            );
        }

        for (name, url) in [
            ("pons.base_url", &self.pons.base_url),
            ("llm.base_url", &self.llm.base_url),
            ("grammar.base_url", &self.grammar.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }

        Ok(())
    }
}
