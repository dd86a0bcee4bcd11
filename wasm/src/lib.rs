//! WebAssembly module for SoilSense
//!
//! Provides client-side computation for:
//! - Health score preview from known conditions
//! - Health and pH banding
//! - Nutrient estimates and soil type descriptions
//! - Upload pre-validation before the photo leaves the device

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::scoring::*;
pub use shared::validation::*;

/// NaN and values beyond `Decimal` range read as zero
fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

/// Moisture fraction kept inside 0..=1
fn to_moisture(value: f64) -> Decimal {
    to_decimal(value).max(Decimal::ZERO).min(Decimal::ONE)
}

/// Health score (0-100) for a moisture fraction and temperature in °C
#[wasm_bindgen]
pub fn calculate_health_score(moisture: f64, temperature: f64) -> i32 {
    health_score(to_moisture(moisture), to_decimal(temperature))
}

/// Health band name for a score
#[wasm_bindgen]
pub fn classify_health(score: i32) -> String {
    HealthStatus::from_score(score).to_string()
}

/// pH band name for a pH level
#[wasm_bindgen]
pub fn classify_ph(ph_level: f64) -> String {
    PhStatus::from_level(to_decimal(ph_level)).to_string()
}

/// Nutrient estimate as JSON (`{"nitrogen":..,"phosphorus":..,"potassium":..}`)
#[wasm_bindgen]
pub fn estimate_nutrients(soil_type: &str, moisture: f64) -> Result<String, JsValue> {
    let levels = nutrient_levels(SoilType::from_label(soil_type), to_moisture(moisture));
    serde_json::to_string(&levels)
        .map_err(|e| JsValue::from_str(&format!("Failed to encode nutrients: {}", e)))
}

/// One-line description of a soil type label
#[wasm_bindgen]
pub fn describe_soil_type(soil_type: &str) -> String {
    SoilType::from_label(soil_type).description().to_string()
}

/// Check a photo before upload. Returns the rejection message, or `None` when
/// the file is acceptable.
#[wasm_bindgen]
pub fn check_upload(content_type: &str, size_bytes: usize) -> Option<String> {
    validate_image_type(Some(content_type))
        .and_then(|_| validate_image_size(size_bytes, MAX_UPLOAD_BYTES))
        .err()
        .map(|rejection| rejection.to_string())
}

/// Whether both coordinate strings are finite numbers
#[wasm_bindgen]
pub fn validate_location(latitude: &str, longitude: &str) -> bool {
    parse_coordinates(Some(latitude), Some(longitude)).is_ok()
}
