//! Configuration management for the SoilSense server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SOILSENSE_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration for the session store
    pub redis: RedisConfig,

    /// Session cookie configuration
    pub session: SessionConfig,

    /// Upload limits
    pub upload: UploadConfig,

    /// Outbound HTTP client settings
    pub http: HttpConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Soil image classifier configuration
    pub classifier: ClassifierConfig,

    /// Generative text API configuration
    pub gemini: GeminiConfig,

    /// Image hosting configuration
    pub cloudinary: CloudinaryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Session lifetime in seconds
    pub ttl_seconds: u64,

    /// Name of the session cookie
    pub cookie_name: String,

    /// Only send the cookie over HTTPS
    pub secure_cookie: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Largest accepted image in bytes
    pub max_file_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Timeout for calls to external providers
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    /// Soil type model endpoint
    pub api_endpoint: String,

    /// Classifier API key
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Generative language API base URL
    pub api_endpoint: String,

    /// Model name
    pub model: String,

    /// API key; enrichment is skipped when unset
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    /// Upload API base URL
    pub api_endpoint: String,

    /// Cloud name
    pub cloud_name: String,

    /// API key
    pub api_key: String,

    /// API secret used to sign uploads
    pub api_secret: String,

    /// Folder uploads are placed in
    pub folder: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SOILSENSE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("session.ttl_seconds", 604800)?
            .set_default("session.cookie_name", "session")?
            .set_default("session.secure_cookie", true)?
            .set_default("upload.max_file_bytes", 10 * 1024 * 1024)?
            .set_default("http.timeout_seconds", 30)?
            .set_default(
                "weather.api_endpoint",
                "https://api.openweathermap.org/data/2.5",
            )?
            .set_default(
                "classifier.api_endpoint",
                "https://serverless.roboflow.com/soil-type-model/1",
            )?
            .set_default(
                "gemini.api_endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.model", "gemini-2.0-flash")?
            .set_default("cloudinary.api_endpoint", "https://api.cloudinary.com/v1_1")?
            .set_default("cloudinary.folder", "soilsense")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SOILSENSE_ prefix)
            .add_source(
                Environment::with_prefix("SOILSENSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            redis: RedisConfig::default(),
            session: SessionConfig::default(),
            upload: UploadConfig::default(),
            http: HttpConfig::default(),
            weather: WeatherConfig::default(),
            classifier: ClassifierConfig::default(),
            gemini: GeminiConfig::default(),
            cloudinary: CloudinaryConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/soilsense".to_string(),
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 604800,
            cookie_name: "session".to_string(),
            secure_cookie: true,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: shared::MAX_UPLOAD_BYTES,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://serverless.roboflow.com/soil-type-model/1".to_string(),
            api_key: String::new(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
        }
    }
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "soilsense".to_string(),
        }
    }
}
