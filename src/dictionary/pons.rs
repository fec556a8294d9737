// PONS dictionary client
//
// Cache first, then the API. A 429 (quota exhausted) falls back to the
// cache once more before giving up. Failures are reported inside the
// response body rather than as HTTP errors, matching what the quiz
// frontend expects.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::cache::PonsCache;
use crate::config::constants::HTTP_TIMEOUT_SECS;

const QUOTA_EXHAUSTED: &str = "API quota reached, no cached result available";
const MISSING_KEY: &str = "PONS API key is not configured";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PonsTranslation {
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceHtml")]
    pub source_html: String,
    #[serde(rename = "targetHtml")]
    pub target_html: String,
}

impl PonsTranslation {
    fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            source_html: format!("<span>{}</span>", source),
            target_html: format!("<span>{}</span>", target),
        }
    }
}

/// Outcome of one lookup, before it is flattened for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PonsLookup {
    pub word: String,
    pub translations: Vec<PonsTranslation>,
    pub error: Option<String>,
    pub is_cached: bool,
}

impl PonsLookup {
    fn found(word: &str, raw: &str, is_cached: bool) -> Self {
        Self {
            word: word.to_string(),
            translations: parse_pons_response(raw),
            error: None,
            is_cached,
        }
    }

    fn failed(word: &str, error: impl Into<String>) -> Self {
        Self {
            word: word.to_string(),
            translations: Vec::new(),
            error: Some(error.into()),
            is_cached: false,
        }
    }

    pub fn into_response(self) -> PonsResponse {
        let mut result = json!({ "translations": self.translations });
        if let Some(error) = self.error {
            result["error"] = Value::String(error);
        }
        PonsResponse {
            word: self.word,
            result: result.to_string(),
            is_cached: self.is_cached,
        }
    }
}

/// Wire format of `/api/dict/pons`: `result` is itself a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PonsResponse {
    pub word: String,
    pub result: String,
    pub is_cached: bool,
}

pub struct PonsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    cache: PonsCache,
}

impl PonsClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, cache: PonsCache) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        if api_key.is_none() {
            tracing::warn!("PONS_API_KEY not set; dictionary lookups will only use the cache");
        }

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Look up a word. Never fails: errors are carried in the result.
    pub async fn get_definition(&self, word: &str) -> PonsLookup {
        if let Some(hit) = self.cached(word).await {
            return hit;
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return PonsLookup::failed(word, MISSING_KEY);
        };

        let response = match self.fetch(word, api_key).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("PONS request for '{}' failed: {:#}", word, e);
                return PonsLookup::failed(word, format!("{:#}", e));
            }
        };

        match response {
            (StatusCode::OK, body) => {
                if let Err(e) = self.cache.put(word, &body).await {
                    tracing::warn!("Failed to cache PONS response for '{}': {:#}", word, e);
                }
                PonsLookup::found(word, &body, false)
            }
            (StatusCode::TOO_MANY_REQUESTS, _) => {
                tracing::warn!("PONS quota exhausted while looking up '{}'", word);
                match self.cached(word).await {
                    Some(hit) => hit,
                    None => PonsLookup::failed(word, QUOTA_EXHAUSTED),
                }
            }
            (status, _) => PonsLookup::failed(word, format!("API error: {}", status.as_u16())),
        }
    }

    async fn cached(&self, word: &str) -> Option<PonsLookup> {
        match self.cache.get(word).await {
            Ok(Some(entry)) => {
                tracing::debug!("PONS cache hit for '{}' (searched {} times)", word, entry.search_count);
                Some(PonsLookup::found(word, &entry.result, true))
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("PONS cache read failed for '{}': {:#}", word, e);
                None
            }
        }
    }

    async fn fetch(&self, word: &str, api_key: &str) -> Result<(StatusCode, String)> {
        let url = format!("{}/v1/dictionary", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", word), ("l", "deen")])
            .header("X-Secret", api_key)
            .send()
            .await
            .context("Failed to send request to PONS API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read PONS API response")?;
        Ok((status, body))
    }
}

/// Flatten `[*].hits[*].roms[*].arabs[*].translations[*]` into pairs.
///
/// Entries missing a source or target are dropped; malformed JSON yields
/// an empty list.
pub fn parse_pons_response(raw: &str) -> Vec<PonsTranslation> {
    let data: Value = match serde_json::from_str(raw) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Error parsing PONS response: {}", e);
            return Vec::new();
        }
    };

    let children = |value: &Value, key: &str| -> Vec<Value> {
        value
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    let Some(entries) = data.as_array() else {
        return Vec::new();
    };

    let mut translations = Vec::new();
    for entry in entries {
        for hit in children(entry, "hits") {
            for rom in children(&hit, "roms") {
                for arab in children(&rom, "arabs") {
                    for translation in children(&arab, "translations") {
                        let field = |key: &str| {
                            translation
                                .get(key)
                                .and_then(Value::as_str)
                                .unwrap_or_default()
                                .to_string()
                        };
                        let (source, target) = (field("source"), field("target"));
                        if !source.is_empty() && !target.is_empty() {
                            translations.push(PonsTranslation::new(&source, &target));
                        }
                    }
                }
            }
        }
    }
    translations
}
