//! SoilSense backend
//!
//! Farmers upload a soil photograph with GPS coordinates and receive a soil
//! health report assembled from an image classifier, current weather, a
//! generative text model and local heuristics.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use external::{ImageStorage, SoilClassifier};
use services::{AnalysisPipeline, AuthService};
use store::AnalysisStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub analyses: Arc<dyn AnalysisStore>,
    pub classifier: Arc<dyn SoilClassifier>,
    pub storage: Arc<dyn ImageStorage>,
    pub pipeline: Arc<AnalysisPipeline>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "SoilSense API v1.0"
}
