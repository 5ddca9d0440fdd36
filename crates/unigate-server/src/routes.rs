//! HTTP routes configuration.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/user/register", post(handlers::register))
        .route("/user/login", post(handlers::login))
        .route("/user/forgot-password", post(handlers::forgot_password))
        .route(
            "/user/verify-forgot-password",
            post(handlers::verify_forgot_password),
        )
        .route("/user/verify-otp", post(handlers::verify_otp))
        .route("/user/forgot-username", post(handlers::forgot_username))
        .route(
            "/user/verify-otp-forgot-username",
            post(handlers::verify_forgot_username),
        )
        .route("/user/list", get(handlers::list_users))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
