//! Drives the real gateway router (mock upstream backend) with the client
//! over a live socket, cookie jar included.

use std::net::SocketAddr;
use std::sync::Arc;

use facilityhub_client::{ApiClient, ApiError, LoginRequest, SessionStore};
use facilityhub_gateway::{
    config::{Config, GateConfig},
    router,
    services::mock_backend::MockAuthBackend,
    state::AppState,
};

fn gateway_state() -> AppState {
    let config = Config {
        backend_base_url: "http://127.0.0.1:1".to_string(),
        jwt_secret: "end-to-end-secret".to_string(),
        production: false,
        use_mock_backend: true,
        refresh_token_expiration_days: 7,
        bind_addr: "127.0.0.1:0".to_string(),
        gate: GateConfig::new(false),
    };
    AppState::new(config, Arc::new(MockAuthBackend::new()))
}

async fn serve_gateway() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gateway");
    let addr = listener.local_addr().expect("local addr");
    let app = router(gateway_state());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve gateway");
    });
    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(format!("http://{}", addr), SessionStore::new()).expect("build client")
}

#[tokio::test]
async fn login_stores_session_and_plants_refresh_cookie() {
    let addr = serve_gateway().await;
    let client = client_for(addr);

    let login = client
        .login(&LoginRequest {
            user_id: "admin".into(),
            password: "admin123".into(),
        })
        .await
        .expect("login");

    assert_eq!(login.access_token, "mock-access-token");
    assert_eq!(login.user.user_roles, vec!["ROLE_ADMIN".to_string()]);
    assert!(client.session().is_authenticated());

    // The cookie jar got the long-lived credential: a refresh works without
    // any bearer token.
    let refreshed = client.refresh_access_token().await;
    assert_eq!(refreshed.as_deref(), Some("mock-access-token"));
}

#[tokio::test]
async fn login_with_wrong_password_maps_the_structured_rejection() {
    let addr = serve_gateway().await;
    let client = client_for(addr);

    let result = client
        .login(&LoginRequest {
            user_id: "admin".into(),
            password: "nope".into(),
        })
        .await;

    match result {
        Err(ApiError::Api { code, message }) => {
            assert_eq!(code, "E00401");
            assert!(!message.is_empty());
        }
        other => panic!("expected API rejection, got {other:?}"),
    }
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn logout_clears_session_and_credential_cookie() {
    let addr = serve_gateway().await;
    let client = client_for(addr);

    client
        .login(&LoginRequest {
            user_id: "admin".into(),
            password: "admin123".into(),
        })
        .await
        .expect("login");

    client.logout().await.expect("logout");
    assert!(!client.session().is_authenticated());

    // The clearing Set-Cookie removed the credential from the jar, so a
    // refresh is now rejected before reaching the backend.
    assert!(client.refresh_access_token().await.is_none());

    // Logout stays idempotent from the client's point of view too.
    client.logout().await.expect("second logout");
}
