use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    services::backend::BackendError,
    state::AppState,
    utils::cookies::{
        build_clear_refresh_cookie, build_refresh_cookie, extract_cookie_value,
        REFRESH_COOKIE_NAME,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

/// `POST /api/auth/login` — proxies the backend login and plants the
/// long-lived credential as an HTTP-only cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    match state.backend.login(&payload.user_id, &payload.password).await {
        Ok(grant) => {
            let cookie = build_refresh_cookie(
                &grant.refresh_token,
                refresh_cookie_max_age(&state),
                state.config.cookie_options(),
            );
            let body = json!({
                "accessToken": grant.access_token,
                "user": grant.user,
                "isInitPassword": grant.is_init_password,
                "isAgreePrivacy": grant.is_agree_privacy,
            });
            with_set_cookie(Json(body).into_response(), &cookie)
        }
        Err(err) => rejection_response(err),
    }
}

/// `POST /api/auth/logout` — clears the credential cookie. Idempotent: a
/// second call without any cookie still succeeds.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(credential) = refresh_credential(&headers) {
        if let Err(err) = state.backend.logout(&credential).await {
            // The cookie is cleared regardless; a failed upstream revocation
            // must not keep the user logged in locally.
            tracing::warn!(error = %err, "Upstream logout failed");
        }
    }

    let cookie = build_clear_refresh_cookie(state.config.cookie_options());
    with_set_cookie(Json(json!({ "success": true })).into_response(), &cookie)
}

/// `POST /api/auth/refresh` — exchanges the cookie credential for a new
/// short-lived token. No local JWT verification happens here; the backend's
/// accept/reject is the only trust decision.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(credential) = refresh_credential(&headers) else {
        return AppError::Unauthorized("Refresh credential missing".to_string()).into_response();
    };

    match state.backend.refresh(&credential).await {
        Ok(grant) => {
            let response = Json(json!({ "accessToken": grant.access_token })).into_response();
            match grant.refresh_token {
                // The backend rotated the long-lived credential; overwrite
                // the cookie with the new one.
                Some(rotated) => {
                    let cookie = build_refresh_cookie(
                        &rotated,
                        refresh_cookie_max_age(&state),
                        state.config.cookie_options(),
                    );
                    with_set_cookie(response, &cookie)
                }
                None => response,
            }
        }
        Err(BackendError::Rejected { code, message }) => {
            // The credential is permanently dead; clear it so clients
            // re-login instead of retrying.
            let response = AppError::Upstream { code, message }.into_response();
            let cookie = build_clear_refresh_cookie(state.config.cookie_options());
            with_set_cookie(response, &cookie)
        }
        Err(BackendError::Transport(err)) => AppError::Internal(err.into()).into_response(),
    }
}

fn refresh_credential(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, REFRESH_COOKIE_NAME))
}

fn refresh_cookie_max_age(state: &AppState) -> Duration {
    Duration::from_secs(state.config.refresh_token_expiration_days * 24 * 3600)
}

fn rejection_response(err: BackendError) -> Response {
    match err {
        BackendError::Rejected { code, message } => {
            AppError::Upstream { code, message }.into_response()
        }
        BackendError::Transport(err) => AppError::Internal(err.into()).into_response(),
    }
}

fn with_set_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(_) => tracing::error!("Failed to encode Set-Cookie header"),
    }
    response
}
