#![allow(dead_code)]

use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};
use chrono::Utc;
use facilityhub_gateway::{
    config::{Config, GateConfig},
    services::mock_backend::MockAuthBackend,
    state::AppState,
    utils::jwt::{issue_access_token, AccountType, Claims},
};
use serde_json::Value;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        backend_base_url: "http://127.0.0.1:1".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        production: false,
        use_mock_backend: true,
        refresh_token_expiration_days: 7,
        bind_addr: "127.0.0.1:0".to_string(),
        gate: GateConfig::new(false),
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config(), Arc::new(MockAuthBackend::new()))
}

pub fn claims_with_roles(user_id: i64, roles: Vec<&str>) -> Claims {
    Claims::new(
        user_id,
        100,
        "Facilities".to_string(),
        AccountType::Company,
        roles.into_iter().map(String::from).collect(),
        200,
        "Acme Management".to_string(),
        300,
        "North Tower".to_string(),
        1,
    )
}

pub fn bearer_for(claims: &Claims) -> String {
    format!(
        "Bearer {}",
        issue_access_token(claims, TEST_SECRET).expect("issue token")
    )
}

pub fn expired_bearer(user_id: i64) -> String {
    let mut claims = claims_with_roles(user_id, vec!["ROLE_MANAGER"]);
    claims.exp = Utc::now().timestamp() - 3600;
    bearer_for(&claims)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn set_cookie_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}
