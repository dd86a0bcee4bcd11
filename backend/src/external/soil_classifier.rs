//! Soil image classifier client
//!
//! Sends the photo to a hosted Roboflow classification model.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use shared::SoilType;

use super::describe_failure;
use crate::config::ClassifierConfig;
use crate::error::{AppError, AppResult};

/// Labels a soil photograph with its dominant soil type
#[async_trait]
pub trait SoilClassifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> AppResult<SoilType>;
}

/// Client for the Roboflow soil type model
#[derive(Clone)]
pub struct RoboflowClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Response from the model endpoint
#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    class: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl RoboflowClient {
    pub fn new(config: &ClassifierConfig, http_client: Client) -> Self {
        Self {
            api_endpoint: config.api_endpoint.clone(),
            api_key: config.api_key.clone(),
            http_client,
        }
    }
}

/// Soil type of the first prediction; no predictions means `Unknown`
fn first_prediction(response: ClassificationResponse) -> SoilType {
    match response.predictions.into_iter().next() {
        Some(prediction) => {
            tracing::debug!(
                "Classifier predicted {} (confidence {:?})",
                prediction.class,
                prediction.confidence
            );
            SoilType::from_label(&prediction.class)
        }
        None => SoilType::Unknown,
    }
}

#[async_trait]
impl SoilClassifier for RoboflowClient {
    async fn classify(&self, image: &[u8]) -> AppResult<SoilType> {
        let response = self
            .http_client
            .post(&self.api_endpoint)
            .query(&[("api_key", self.api_key.as_str())])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(STANDARD.encode(image))
            .send()
            .await
            .map_err(|e| AppError::Classifier(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Classifier(describe_failure(response).await));
        }

        let result: ClassificationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Classifier(format!("Failed to parse response: {}", e)))?;

        Ok(first_prediction(result))
    }
}
