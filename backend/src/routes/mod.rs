//! Route definitions for the SoilSense API

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::session_middleware, AppState};

/// Room for multipart boundaries and the coordinate fields on top of the image
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .merge(analysis_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::get_session))
        .route("/check", get(handlers::check_auth))
}

/// Analysis and upload routes (protected)
fn analysis_routes(state: AppState) -> Router<AppState> {
    let body_limit = state.config.upload.max_file_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/analyses", get(handlers::list_analyses))
        .route("/analyses/:analysis_id", get(handlers::get_analysis))
        .route(
            "/upload",
            post(handlers::upload_soil_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state, session_middleware))
}
