//! Image hosting client
//!
//! Uploads soil photographs to Cloudinary with a signed request and returns
//! the public HTTPS URL.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use shared::sanitize_filename;

use super::describe_failure;
use crate::config::CloudinaryConfig;
use crate::error::{AppError, AppResult};

/// Stores an uploaded image and returns its public URL
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn store(&self, bytes: &[u8], filename: &str, content_type: &str) -> AppResult<String>;
}

#[derive(Clone)]
pub struct CloudinaryClient {
    api_endpoint: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Lowercase hex SHA-256 of `data`
fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Object name for an upload: `soil-{first 8 hex of content sha256}-{name}`
pub fn public_id(bytes: &[u8], filename: &str) -> String {
    let digest = sha256_hex(bytes);
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);
    let name = sanitize_filename(stem);

    if name.is_empty() {
        format!("soil-{}", &digest[..8])
    } else {
        format!("soil-{}-{}", &digest[..8], name)
    }
}

/// Sign upload parameters: sorted `key=value` pairs joined by `&`, then the secret
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    sha256_hex(format!("{}{}", to_sign, api_secret).as_bytes())
}

impl CloudinaryClient {
    pub fn new(config: &CloudinaryConfig, http_client: Client) -> Self {
        Self {
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
            http_client,
        }
    }
}

#[async_trait]
impl ImageStorage for CloudinaryClient {
    async fn store(&self, bytes: &[u8], filename: &str, content_type: &str) -> AppResult<String> {
        let url = format!("{}/{}/image/upload", self.api_endpoint, self.cloud_name);
        let public_id = public_id(bytes, filename);
        let timestamp = Utc::now().timestamp().to_string();

        let signed = [
            ("folder", self.folder.as_str()),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign(&signed, &self.api_secret);
        let file = format!("data:{};base64,{}", content_type, STANDARD.encode(bytes));

        let mut form: Vec<(&str, &str)> = signed.to_vec();
        form.push(("file", file.as_str()));
        form.push(("api_key", self.api_key.as_str()));
        form.push(("signature", signature.as_str()));
        form.push(("signature_algorithm", "sha256"));

        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::StorageError(describe_failure(response).await));
        }

        let result: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to parse upload response: {}", e)))?;

        let secure_url = result
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::StorageError("Upload returned no URL".to_string()))?;

        tracing::info!("Stored image {} at {}", public_id, secure_url);
        Ok(secure_url)
    }
}
