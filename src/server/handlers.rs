// HTTP request handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::corpus::NounRecord;
use crate::dictionary::{PonsResponse, WordLookup};
use crate::errors::ApiError;
use crate::progress::{ProgressMap, ProgressUpdate};
use crate::quiz::{next_verb_question, shuffled_nouns, shuffled_sentences, SentenceCard};

#[derive(Debug, Deserialize)]
pub struct WordQuery {
    #[serde(default)]
    pub word: String,
}

impl WordQuery {
    fn required(&self) -> Result<&str, ApiError> {
        let word = self.word.trim();
        if word.is_empty() {
            return Err(ApiError::bad_request("Missing 'word' query parameter"));
        }
        Ok(word)
    }
}

/// Liveness plus corpus sizes
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.corpus.stats();
    Json(json!({
        "status": "ok",
        "verbs": stats.verbs,
        "sentences": stats.sentences,
        "nouns": stats.nouns,
    }))
}

/// Prometheus text exposition
pub async fn metrics_endpoint(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.metrics.render()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

pub async fn next_verb_quiz(State(state): State<AppState>) -> Response {
    match next_verb_question(&state.corpus, state.chooser.as_ref()) {
        Some(question) => {
            state.metrics.record_verb_quiz(question.sentence.is_some());
            Json(question).into_response()
        }
        None => {
            tracing::warn!("Verb quiz requested but no verbs are loaded");
            Json(json!({ "error": "No verbs available" })).into_response()
        }
    }
}

pub async fn list_nouns(State(state): State<AppState>) -> Json<Vec<NounRecord>> {
    Json(shuffled_nouns(&state.corpus, state.chooser.as_ref()))
}

pub async fn list_sentences(State(state): State<AppState>) -> Json<Vec<SentenceCard>> {
    Json(shuffled_sentences(&state.corpus, state.chooser.as_ref()))
}

pub async fn get_progress(State(state): State<AppState>) -> Result<Json<ProgressMap>, ApiError> {
    Ok(Json(state.progress.load().await?))
}

pub async fn save_progress(
    State(state): State<AppState>,
    body: Result<Json<ProgressUpdate>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Ok(Json(update)) = body else {
        return Err(ApiError::bad_request("Invalid data"));
    };
    let Some((date, progress)) = update.into_entry() else {
        return Err(ApiError::bad_request("Invalid data"));
    };

    tracing::debug!("Recording progress for {}: {}/{}", date, progress.correct, progress.total);
    state.progress.record(date, progress).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn lookup_word(
    State(state): State<AppState>,
    Query(query): Query<WordQuery>,
) -> Result<Json<WordLookup>, ApiError> {
    let word = query.required()?;

    match state.grammar.lookup(word).await {
        Ok(lookup) => Ok(Json(lookup)),
        Err(e) => {
            state.metrics.record_upstream_error("grammar");
            tracing::warn!("Grammar lookup for '{}' failed: {:#}", word, e);
            Err(ApiError::Upstream(format!("Failed to fetch data from grammar site: {:#}", e)))
        }
    }
}

pub async fn pons_lookup(
    State(state): State<AppState>,
    Query(query): Query<WordQuery>,
) -> Result<Json<PonsResponse>, ApiError> {
    let word = query.required()?;

    let lookup = state.pons.get_definition(word).await;
    let source = match (&lookup.error, lookup.is_cached) {
        (Some(_), _) => {
            state.metrics.record_upstream_error("pons");
            "error"
        }
        (None, true) => "cache",
        (None, false) => "api",
    };
    state.metrics.record_pons_lookup(source);

    Ok(Json(lookup.into_response()))
}

pub async fn generate_examples(
    State(state): State<AppState>,
    Query(query): Query<WordQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let word = query.required()?;

    let Some(generator) = state.examples.as_ref() else {
        return Ok(Json(json!({ "error": "OPENAI_API_KEY is not configured" })));
    };

    match generator.generate(word).await {
        Ok(examples) => Ok(Json(json!({ "examples": examples }))),
        Err(e) => {
            state.metrics.record_upstream_error("llm");
            tracing::warn!("Example generation for '{}' failed: {:#}", word, e);
            Ok(Json(json!({ "error": format!("{:#}", e) })))
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
