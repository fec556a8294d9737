// Error types and user-facing error messages

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced by HTTP handlers.
///
/// Every variant renders as `{"error": "<message>"}` with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{:#}", self);
        }
        (status, Json(json!({ "error": format!("{:#}", self) }))).into_response()
    }
}

/// Attach an actionable hint below an error message.
pub fn wrap_error_with_suggestion(message: impl AsRef<str>, suggestion: &str) -> String {
    format!("{}\n\n{}", message.as_ref(), suggestion)
}

pub fn file_not_found_error(path: &str, what: &str) -> String {
    wrap_error_with_suggestion(
        format!("{} not found: {}", what, path),
        "Check the path, or omit --config to use ~/.vocab-quiz/config.toml",
    )
}

pub fn config_parse_error(detail: &str) -> String {
    wrap_error_with_suggestion(
        format!("Failed to parse configuration: {}", detail),
        "The config file must be valid TOML. Sections: [server], [data], [pons], [llm], [grammar], [quiz]",
    )
}
