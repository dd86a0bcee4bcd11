//! In-memory stand-ins for the external providers and stores

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use rust_decimal::Decimal;
use shared::{NewSoilAnalysis, SessionUser, SoilAnalysis, SoilType, User};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use soilsense_backend::{
    create_app,
    error::{AppError, AppResult},
    external::{CurrentWeather, ImageStorage, SoilClassifier, TextGenerator, WeatherProvider},
    models::{NewUser, UserRow},
    services::{AnalysisPipeline, AuthService},
    store::{AnalysisStore, SessionStore, UserStore},
    AppState, Config,
};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Providers
// ============================================================================

pub struct FakeWeather {
    pub reading: Option<CurrentWeather>,
}

impl FakeWeather {
    pub fn reporting(humidity: &str, temperature: &str) -> Self {
        Self {
            reading: Some(CurrentWeather {
                humidity_percent: dec(humidity),
                temperature_celsius: dec(temperature),
            }),
        }
    }

    pub fn failing() -> Self {
        Self { reading: None }
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, _latitude: Decimal, _longitude: Decimal) -> AppResult<CurrentWeather> {
        self.reading
            .ok_or_else(|| AppError::WeatherApi("connection refused".to_string()))
    }
}

pub struct FakeClassifier {
    pub soil_type: SoilType,
    pub calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn new(soil_type: SoilType) -> Self {
        Self {
            soil_type,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SoilClassifier for FakeClassifier {
    async fn classify(&self, _image: &[u8]) -> AppResult<SoilType> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.soil_type)
    }
}

pub struct FakeGenerator {
    pub response: Result<String, String>,
}

impl FakeGenerator {
    pub fn answering(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: Err("quota exceeded".to_string()),
        }
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        self.response.clone().map_err(AppError::GenerativeApi)
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ImageStorage for FakeStorage {
    async fn store(&self, _bytes: &[u8], filename: &str, _content_type: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::StorageError("upload rejected".to_string()));
        }
        Ok(format!("https://images.test/soilsense/{}", filename))
    }
}

// ============================================================================
// Stores
// ============================================================================

#[derive(Default)]
pub struct MemoryAnalysisStore {
    pub records: Mutex<Vec<SoilAnalysis>>,
    pub fail_inserts: bool,
}

impl MemoryAnalysisStore {
    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Put a finished record in directly
    pub fn seed(&self, analysis: SoilAnalysis) {
        self.records.lock().unwrap().push(analysis);
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn insert(&self, analysis: &NewSoilAnalysis) -> AppResult<SoilAnalysis> {
        if self.fail_inserts {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }

        let stored = SoilAnalysis {
            id: Uuid::new_v4(),
            user_id: analysis.user_id,
            image_url: analysis.image_url.clone(),
            soil_type: analysis.soil_type,
            soil_description: analysis.soil_description.clone(),
            health_score: analysis.health_score,
            health_status: analysis.health_status,
            ph_level: analysis.ph.ph_level,
            ph_status: analysis.ph.ph_status,
            recommended_crops: analysis.recommended_crops.clone(),
            recommendations: analysis.recommendations.clone(),
            nitrogen: analysis.nutrients.nitrogen,
            phosphorus: analysis.nutrients.phosphorus,
            potassium: analysis.nutrients.potassium,
            moisture: analysis.conditions.moisture,
            temperature: analysis.conditions.temperature,
            latitude: analysis.latitude,
            longitude: analysis.longitude,
            address: None,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<SoilAnalysis>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<SoilAnalysis>> {
        let mut owned: Vec<SoilAnalysis> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserRow>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let row = UserRow {
            id: Uuid::new_v4(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            farm_location: user.farm_location.clone(),
            farm_size: user.farm_size.clone(),
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(row.clone());
        Ok(User::from(row))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionUser>>,
}

impl MemorySessionStore {
    /// Open a session without going through signup
    pub fn insert(&self, token: &str, user: SessionUser) {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), user);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user: &SessionUser) -> AppResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.insert(&token, user.clone());
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> AppResult<Option<SessionUser>> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }
}

// ============================================================================
// Application
// ============================================================================

pub fn farmer(first_name: &str) -> SessionUser {
    SessionUser {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: "Banda".to_string(),
        email: format!("{}@farm.test", first_name.to_lowercase()),
        farm_location: None,
        farm_size: None,
    }
}

pub fn pipeline(
    weather: Option<Arc<dyn WeatherProvider>>,
    generator: Option<Arc<dyn TextGenerator>>,
    store: Arc<dyn AnalysisStore>,
) -> AnalysisPipeline {
    AnalysisPipeline::new(weather, generator, store, StdRng::seed_from_u64(7))
}

/// Everything a router test needs to inspect after a request
pub struct TestApp {
    pub router: Router,
    pub analyses: Arc<MemoryAnalysisStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub classifier: Arc<FakeClassifier>,
    pub storage: Arc<FakeStorage>,
}

impl TestApp {
    /// App with Sandy soil, 45% humidity at 30°C and no text generator.
    /// Must be built inside a Tokio runtime.
    pub fn new() -> Self {
        Self::with_storage(FakeStorage::default())
    }

    pub fn with_storage(storage: FakeStorage) -> Self {
        let analyses = Arc::new(MemoryAnalysisStore::default());
        let sessions = Arc::new(MemorySessionStore::default());
        let classifier = Arc::new(FakeClassifier::new(SoilType::Sandy));
        let storage = Arc::new(storage);

        // Nothing listens on port 1; the health check reports the outage
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://soilsense@127.0.0.1:1/soilsense")
            .unwrap();

        let mut config = Config::default();
        config.session.secure_cookie = false;

        let weather: Arc<dyn WeatherProvider> = Arc::new(FakeWeather::reporting("45", "30"));
        let auth = AuthService::new(Arc::new(MemoryUserStore::default()), sessions.clone())
            .with_hash_cost(4);

        let state = AppState {
            db,
            config: Arc::new(config),
            auth,
            analyses: analyses.clone(),
            classifier: classifier.clone(),
            storage: storage.clone(),
            pipeline: Arc::new(pipeline(Some(weather), None, analyses.clone())),
        };

        Self {
            router: create_app(state),
            analyses,
            sessions,
            classifier,
            storage,
        }
    }

    /// Open a session for a new farmer and return it with its cookie header
    pub fn sign_in(&self, first_name: &str) -> (SessionUser, String) {
        let user = farmer(first_name);
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(&token, user.clone());
        (user, format!("session={}", token))
    }
}
