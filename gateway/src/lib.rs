pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware as axum_middleware, routing::post, Router};

use crate::state::AppState;

/// Auth routes plus the perimeter gate, with nothing mounted behind it.
pub fn router(state: AppState) -> Router {
    router_with_app(state, Router::new())
}

/// Same, with application routes mounted behind the gate. Protected routes
/// receive the `x-user-id`/`x-user-roles` headers and a typed
/// [`middleware::gate::AuthContext`] extension.
pub fn router_with_app(state: AppState, app: Router<AppState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .merge(app)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::gate,
        ))
        .with_state(state)
}
