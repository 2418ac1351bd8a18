use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Uniform error body: every non-2xx response from the gateway carries a
/// `code` and a `message`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    /// Structured rejection relayed from the upstream backend.
    Upstream { code: String, message: String },
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "E00400".to_string(), msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "E00401".to_string(), msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E00403".to_string(), msg),
            AppError::Upstream { code, message } => (StatusCode::UNAUTHORIZED, code, message),
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E00500".to_string(),
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
