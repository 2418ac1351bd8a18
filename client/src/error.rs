use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The session is gone for good: no token and the refresh cycle failed.
    #[error("not authenticated")]
    Unauthenticated,
    /// Structured rejection parsed from a non-2xx response body.
    #[error("{message} ({code})")]
    Api { code: String, message: String },
    /// No usable HTTP response at all. Kept distinct from parsed API errors
    /// so callers can tell a dead network from a rejected request.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}
