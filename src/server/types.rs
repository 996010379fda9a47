use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::BulletinError;
use crate::utils::pdf::ExtractionResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

impl From<ExtractionResult> for TextResponse {
    fn from(result: ExtractionResult) -> Self {
        Self { text: result.text }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

impl IntoResponse for BulletinError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            BulletinError::Validation(msg) => {
                warn!(target: "http", "Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone()))
            }
            BulletinError::NotFound { .. } => {
                warn!(target: "http", "{}", self);
                (
                    StatusCode::NOT_FOUND,
                    ErrorBody::with_message("No publication available", self.to_string()),
                )
            }
            BulletinError::Network(e) => {
                error!(target: "http", "Bulletin fetch failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::with_message("Failed to fetch the bulletin", e.to_string()),
                )
            }
            BulletinError::Decode(e) => {
                error!(target: "http", "Bulletin extraction failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::with_message("Failed to extract text from the bulletin", e.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
