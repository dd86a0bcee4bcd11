//! Soil analysis persistence

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{AnalysisRow, NewSoilAnalysis, SoilAnalysis, ANALYSIS_COLUMNS};

/// Storage for finished soil analyses. Records are written once and never updated.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Write a complete record in one statement and return it with its id
    async fn insert(&self, analysis: &NewSoilAnalysis) -> AppResult<SoilAnalysis>;

    async fn find(&self, id: Uuid) -> AppResult<Option<SoilAnalysis>>;

    /// All analyses of one user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<SoilAnalysis>>;
}

#[derive(Clone)]
pub struct PgAnalysisStore {
    db: PgPool,
}

impl PgAnalysisStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, analysis: &NewSoilAnalysis) -> AppResult<SoilAnalysis> {
        let query = format!(
            r#"
            INSERT INTO soil_analyses (
                user_id, image_url, soil_type, soil_description, health_score, health_status,
                ph_level, ph_status, recommended_crops, recommendations,
                nitrogen, phosphorus, potassium, moisture, temperature, latitude, longitude
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            ANALYSIS_COLUMNS
        );

        let row = sqlx::query_as::<_, AnalysisRow>(&query)
            .bind(analysis.user_id)
            .bind(&analysis.image_url)
            .bind(analysis.soil_type.as_str())
            .bind(&analysis.soil_description)
            .bind(analysis.health_score)
            .bind(analysis.health_status.as_str())
            .bind(analysis.ph.ph_level)
            .bind(analysis.ph.ph_status.as_str())
            .bind(&analysis.recommended_crops)
            .bind(&analysis.recommendations)
            .bind(analysis.nutrients.nitrogen)
            .bind(analysis.nutrients.phosphorus)
            .bind(analysis.nutrients.potassium)
            .bind(analysis.conditions.moisture)
            .bind(analysis.conditions.temperature)
            .bind(analysis.latitude)
            .bind(analysis.longitude)
            .fetch_one(&self.db)
            .await?;

        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<SoilAnalysis>> {
        let query = format!("SELECT {} FROM soil_analyses WHERE id = $1", ANALYSIS_COLUMNS);

        let row = sqlx::query_as::<_, AnalysisRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(SoilAnalysis::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<SoilAnalysis>> {
        let query = format!(
            "SELECT {} FROM soil_analyses WHERE user_id = $1 ORDER BY created_at DESC",
            ANALYSIS_COLUMNS
        );

        let rows = sqlx::query_as::<_, AnalysisRow>(&query)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(SoilAnalysis::from).collect())
    }
}
