// Project-wide constants
//
// Centralised here so port numbers and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default bind address for the HTTP server (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Placeholder substituted for the matched verb form in quiz sentences.
pub const BLANK_MARKER: &str = "____";

/// Workbook holding the Verb, Sentences and Noun sheets.
pub const DEFAULT_WORKBOOK_PATH: &str = "resource/learn_vocab.xlsx";

/// Directory for the progress file and the PONS cache.
pub const DEFAULT_DATA_DIR: &str = "app/data";

pub const PROGRESS_FILE_NAME: &str = "quiz_progress.json";
pub const PONS_CACHE_FILE_NAME: &str = "pons_cache.db";

pub const DEFAULT_PONS_BASE_URL: &str = "https://api.pons.com";
pub const DEFAULT_GRAMMAR_BASE_URL: &str = "https://www.verbformen.de";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// Request bodies are tiny JSON objects; 64KB is plenty.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Timeout for outbound HTTP calls (PONS, grammar site).
pub const HTTP_TIMEOUT_SECS: u64 = 15;
