//! Error type for the JSON endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use editais_client::ClientError;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Upstream(#[from] ClientError),

    #[error("not found: {0}")]
    NotFound(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Upstream(e) if e.is_auth_failure() => StatusCode::UNAUTHORIZED,
            WebError::Upstream(ClientError::Transport(e)) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            WebError::Upstream(ClientError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            WebError::Upstream(_) => StatusCode::BAD_GATEWAY,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let message = match &self {
            WebError::Upstream(e) => e.user_message(),
            WebError::NotFound(what) => format!("{what} não encontrado"),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
