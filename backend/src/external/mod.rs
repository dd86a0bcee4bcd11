//! External API integrations
//!
//! Each provider sits behind a trait so the pipeline can run against fakes.

use std::time::Duration;

use reqwest::Client;

use crate::error::{AppError, AppResult};

pub mod cloudinary;
pub mod gemini;
pub mod soil_classifier;
pub mod weather;

pub use cloudinary::{CloudinaryClient, ImageStorage};
pub use gemini::{GeminiClient, TextGenerator};
pub use soil_classifier::{RoboflowClient, SoilClassifier};
pub use weather::{CurrentWeather, WeatherClient, WeatherProvider};

/// HTTP client shared by the provider clients, with a fixed request timeout
pub fn http_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Read a failed response into an error message
pub(crate) async fn describe_failure(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    format!("API returned {}: {}", status, body)
}
