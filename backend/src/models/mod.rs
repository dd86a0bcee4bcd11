//! Database models for SoilSense
//!
//! Re-exports models from the shared crate and adds the row types read back
//! from PostgreSQL

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub use shared::models::*;

/// Column list shared by every `soil_analyses` query
pub const ANALYSIS_COLUMNS: &str = "id, user_id, image_url, soil_type, soil_description, \
    health_score, health_status, ph_level, ph_status, recommended_crops, recommendations, \
    nitrogen, phosphorus, potassium, moisture, temperature, latitude, longitude, address, \
    created_at";

/// Column list for `users` reads
pub const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, farm_location, farm_size, created_at";

/// Soil analysis row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub soil_type: String,
    pub soil_description: String,
    pub health_score: i32,
    pub health_status: String,
    pub ph_level: Decimal,
    pub ph_status: String,
    pub recommended_crops: Vec<String>,
    pub recommendations: Vec<String>,
    pub nitrogen: i32,
    pub phosphorus: i32,
    pub potassium: i32,
    pub moisture: Decimal,
    pub temperature: Decimal,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AnalysisRow> for SoilAnalysis {
    fn from(row: AnalysisRow) -> Self {
        // Unexpected stored bands are recomputed
        let health_status = HealthStatus::parse(&row.health_status)
            .unwrap_or_else(|| HealthStatus::from_score(row.health_score));
        let ph_status =
            PhStatus::parse(&row.ph_status).unwrap_or_else(|| PhStatus::from_level(row.ph_level));

        SoilAnalysis {
            id: row.id,
            user_id: row.user_id,
            image_url: row.image_url,
            soil_type: SoilType::from_label(&row.soil_type),
            soil_description: row.soil_description,
            health_score: row.health_score,
            health_status,
            ph_level: row.ph_level,
            ph_status,
            recommended_crops: row.recommended_crops,
            recommendations: row.recommendations,
            nitrogen: row.nitrogen,
            phosphorus: row.phosphorus,
            potassium: row.potassium,
            moisture: row.moisture,
            temperature: row.temperature,
            latitude: row.latitude,
            longitude: row.longitude,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

/// User row including the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub farm_location: Option<String>,
    pub farm_size: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            farm_location: row.farm_location,
            farm_size: row.farm_size,
            created_at: row.created_at,
        }
    }
}

/// Account waiting to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub farm_location: Option<String>,
    pub farm_size: Option<String>,
}
