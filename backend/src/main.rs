//! SoilSense - Backend Server
//!
//! Soil health reports for farmers from a photograph and a GPS position.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soilsense_backend::{
    create_app,
    external::{
        http_client, CloudinaryClient, GeminiClient, ImageStorage, RoboflowClient, SoilClassifier,
        TextGenerator, WeatherClient, WeatherProvider,
    },
    services::{AnalysisPipeline, AuthService},
    store::{AnalysisStore, PgAnalysisStore, PgUserStore, RedisSessionStore},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "soilsense_server=debug,soilsense_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting SoilSense Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let sessions = RedisSessionStore::new(&config.redis.url, config.session.ttl_seconds)?;

    // External providers
    let http = http_client(Duration::from_secs(config.http.timeout_seconds))?;

    let weather: Option<Arc<dyn WeatherProvider>> =
        match WeatherClient::new(&config.weather, http.clone()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!("{}; every analysis will use fallback conditions", e);
                None
            }
        };

    let generator: Option<Arc<dyn TextGenerator>> =
        match GeminiClient::new(&config.gemini, http.clone()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("{}; narrative enrichment disabled", e);
                None
            }
        };

    let classifier: Arc<dyn SoilClassifier> =
        Arc::new(RoboflowClient::new(&config.classifier, http.clone()));
    let storage: Arc<dyn ImageStorage> = Arc::new(CloudinaryClient::new(&config.cloudinary, http));

    let analyses: Arc<dyn AnalysisStore> = Arc::new(PgAnalysisStore::new(db_pool.clone()));
    let pipeline = AnalysisPipeline::new(weather, generator, analyses.clone(), StdRng::from_entropy());

    // Create application state
    let state = AppState {
        db: db_pool.clone(),
        config: Arc::new(config.clone()),
        auth: AuthService::new(Arc::new(PgUserStore::new(db_pool)), Arc::new(sessions)),
        analyses,
        classifier,
        storage,
        pipeline: Arc::new(pipeline),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
