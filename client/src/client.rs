use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::ApiError,
    session::SessionStore,
    singleflight::Singleflight,
    types::{Envelope, ErrorBody, LoginRequest, LoginResponse, RefreshResponse},
};

type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// HTTP client for the facilityhub gateway. Injects the bearer token from
/// its session store and transparently recovers from token expiry: a 401
/// triggers one coalesced refresh followed by one retry of the original
/// request. Everything else is surfaced to the caller.
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
    refresh_flight: Singleflight<Option<String>>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl ApiClient {
    /// The cookie store stands in for the browser: it carries the HTTP-only
    /// refresh credential set by the gateway.
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            session,
            refresh_flight: Singleflight::new(),
            on_session_expired: None,
        })
    }

    /// Invoked when a refresh cycle fails and the session is cleared; the
    /// embedding UI typically navigates to the login page here.
    pub fn with_session_expired_hook(
        mut self,
        hook: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            let login: LoginResponse = response.json().await.map_err(ApiError::Decode)?;
            self.session
                .set_session(login.access_token.clone(), login.user.clone());
            Ok(login)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.http.post(self.url("/api/auth/logout")).send().await?;
        // Local state goes regardless of what the gateway said.
        self.session.clear();
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Exchanges the cookie credential for a fresh access token. Concurrent
    /// callers are coalesced into a single network call; everyone observes
    /// the same outcome. `None` means the credential is dead.
    pub async fn refresh_access_token(&self) -> Option<String> {
        self.refresh_flight
            .run(|| async {
                let response = match self.http.post(self.url("/api/auth/refresh")).send().await {
                    Ok(response) => response,
                    Err(err) => {
                        log::warn!("token refresh transport error: {err}");
                        return None;
                    }
                };
                if !response.status().is_success() {
                    log::info!("token refresh rejected: {}", response.status());
                    return None;
                }
                match response.json::<RefreshResponse>().await {
                    Ok(body) => {
                        self.session.set_access_token(body.access_token.clone());
                        Some(body.access_token)
                    }
                    Err(err) => {
                        log::warn!("token refresh decode error: {err}");
                        None
                    }
                }
            })
            .await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None::<&()>, true).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), true).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body), true).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, None::<&()>, true).await
    }

    /// Opt-out variant: no bearer token, no refresh cycle.
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None::<&()>, false).await
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = if authenticated {
            self.session.access_token()
        } else {
            None
        };
        let mut response = self.send(method.clone(), path, body, token).await?;

        if authenticated && response.status() == StatusCode::UNAUTHORIZED {
            match self.refresh_access_token().await {
                Some(token) => {
                    // Retry exactly once with the fresh token; whatever comes
                    // back is the final answer.
                    response = self.send(method, path, body, Some(token)).await?;
                }
                None => {
                    self.session.clear();
                    if let Some(hook) = &self.on_session_expired {
                        hook();
                    }
                    return Err(ApiError::Unauthenticated);
                }
            }
        }

        if response.status().is_success() {
            let envelope: Envelope<T> = response.json().await.map_err(ApiError::Decode)?;
            Ok(envelope.data)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<String>,
    ) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    async fn api_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => ApiError::Api {
                code: body.code,
                message: body.message,
            },
            // Unstructured body; synthesize the same shape from the status.
            Err(_) => ApiError::Api {
                code: format!("E{:05}", status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
            },
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
