use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::utils::jwt::AuthenticatedUser;

/// Result of a successful upstream login: a short-lived access token, the
/// long-lived refresh credential, and the user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthenticatedUser,
    #[serde(default)]
    pub is_init_password: bool,
    #[serde(default)]
    pub is_agree_privacy: bool,
}

/// Result of a successful refresh. The backend decides whether to rotate the
/// long-lived credential; `refresh_token` is only present when it did.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    code: String,
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend rejected the credentials or the refresh credential.
    #[error("{message} ({code})")]
    Rejected { code: String, message: String },
    /// No usable response from the backend at all.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Seam to the separate backend service that owns accounts and credentials.
/// The gateway never verifies the long-lived credential itself; it delegates
/// trust entirely to this interface.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, user_id: &str, password: &str) -> Result<LoginGrant, BackendError>;
    async fn refresh(&self, credential: &str) -> Result<RefreshGrant, BackendError>;
    async fn logout(&self, credential: &str) -> Result<(), BackendError>;
}

pub struct HttpAuthBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn rejection(response: reqwest::Response) -> BackendError {
        let status = response.status();
        match response.json::<UpstreamError>().await {
            Ok(body) => BackendError::Rejected {
                code: body.code,
                message: body.message,
            },
            Err(_) => BackendError::Rejected {
                code: format!("E{:05}", status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("Upstream request failed")
                    .to_string(),
            },
        }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, user_id: &str, password: &str) -> Result<LoginGrant, BackendError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "userId": user_id, "password": password }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<LoginGrant>().await?)
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn refresh(&self, credential: &str) -> Result<RefreshGrant, BackendError> {
        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&json!({ "refreshToken": credential }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<RefreshGrant>().await?)
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn logout(&self, credential: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.url("/auth/logout"))
            .json(&json!({ "refreshToken": credential }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }
}
