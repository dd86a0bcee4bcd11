//! Soil analysis pipeline
//!
//! conditions -> health score -> enrichment -> nutrients -> pH -> assemble -> persist
//!
//! Weather and enrichment are best effort and fall back to fixed values; only
//! the final write can fail the request.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rust_decimal::Decimal;
use shared::{
    describe_conditions, estimate_ph, generate_recommendations, nutrient_levels,
    raw_health_score, recommended_crops, Availability, GpsCoordinates, HealthStatus, NewSoilAnalysis,
    NutrientLevels, PhReading, SoilAnalysis, SoilConditions, SoilType,
};
use uuid::Uuid;

use super::conditions::fetch_conditions;
use super::enrichment::{EnrichedReport, NarrativeEnricher};
use crate::error::AppResult;
use crate::external::{SoilClassifier, TextGenerator, WeatherProvider};
use crate::store::AnalysisStore;

/// Locally computed part of a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub soil_type: SoilType,
    pub conditions: SoilConditions,
    pub health_score: i32,
    pub nutrients: NutrientLevels,
    pub ph: PhReading,
}

/// Merge the local assessment with the optional narrative into one record.
///
/// Each narrative field replaces its static counterpart only when non-empty.
pub fn assemble(
    user_id: Uuid,
    image_url: String,
    coordinates: GpsCoordinates,
    assessment: Assessment,
    enrichment: Option<&EnrichedReport>,
) -> NewSoilAnalysis {
    let Assessment {
        soil_type,
        conditions,
        health_score,
        nutrients,
        ph,
    } = assessment;

    let characteristics = enrichment.map(|e| e.characteristics()).unwrap_or_default();
    let soil_description = if characteristics.is_empty() {
        describe_conditions(soil_type, &conditions)
    } else {
        characteristics.join("\n")
    };

    let crops = enrichment
        .map(|e| e.recommended_crops())
        .filter(|crops| !crops.is_empty())
        .unwrap_or_else(|| recommended_crops(soil_type));

    let recommendations = enrichment
        .map(|e| e.recommendations())
        .filter(|lines| !lines.is_empty())
        .unwrap_or_else(|| generate_recommendations(soil_type, health_score));

    NewSoilAnalysis {
        user_id,
        image_url,
        soil_type,
        soil_description,
        health_score,
        health_status: HealthStatus::from_score(health_score),
        ph,
        recommended_crops: crops,
        recommendations,
        nutrients,
        conditions,
        latitude: Some(coordinates.latitude),
        longitude: Some(coordinates.longitude),
    }
}

/// Classify an image, treating any classifier failure as `Unknown`
pub async fn detect_soil_type(classifier: &dyn SoilClassifier, image: &[u8]) -> SoilType {
    match classifier.classify(image).await {
        Ok(soil_type) => soil_type,
        Err(e) => {
            tracing::warn!("Soil classification failed, using Unknown: {}", e);
            SoilType::Unknown
        }
    }
}

pub struct AnalysisPipeline {
    weather: Option<Arc<dyn WeatherProvider>>,
    enricher: NarrativeEnricher,
    store: Arc<dyn AnalysisStore>,
    rng: Mutex<StdRng>,
}

impl AnalysisPipeline {
    pub fn new(
        weather: Option<Arc<dyn WeatherProvider>>,
        generator: Option<Arc<dyn TextGenerator>>,
        store: Arc<dyn AnalysisStore>,
        rng: StdRng,
    ) -> Self {
        Self {
            weather,
            enricher: NarrativeEnricher::new(generator),
            store,
            rng: Mutex::new(rng),
        }
    }

    /// Build the report for an uploaded image and persist it
    pub async fn analyze(
        &self,
        user_id: Uuid,
        image_url: String,
        latitude: Decimal,
        longitude: Decimal,
        soil_type: SoilType,
    ) -> AppResult<SoilAnalysis> {
        let coordinates = GpsCoordinates::new(latitude, longitude);

        let conditions = fetch_conditions(self.weather.as_deref(), latitude, longitude)
            .await
            .unwrap_or_else(|reason| {
                tracing::warn!("Weather unavailable, using fallback conditions: {}", reason);
                SoilConditions::FALLBACK
            });

        let health_score = self.health_score(&conditions);

        let enrichment = match self
            .enricher
            .enrich(soil_type, health_score, &conditions, coordinates)
            .await
        {
            Availability::Available(report) => Some(report),
            Availability::Unavailable { reason } => {
                tracing::warn!("Narrative enrichment unavailable: {}", reason);
                None
            }
        };

        let nutrients = nutrient_levels(soil_type, conditions.moisture);
        let ph = self.draw_ph(soil_type);

        let record = assemble(
            user_id,
            image_url,
            coordinates,
            Assessment {
                soil_type,
                conditions,
                health_score,
                nutrients,
                ph,
            },
            enrichment.as_ref(),
        );

        let analysis = self.store.insert(&record).await?;
        tracing::info!(
            "Stored analysis {} for user {}: {} soil, health {}",
            analysis.id,
            user_id,
            analysis.soil_type,
            analysis.health_score
        );

        Ok(analysis)
    }

    fn health_score(&self, conditions: &SoilConditions) -> i32 {
        let raw = raw_health_score(conditions.moisture, conditions.temperature);
        let score = raw.clamp(0, 100);
        if score != raw {
            tracing::warn!(
                "Health score {} out of range for moisture {} and temperature {}, clamped to {}",
                raw,
                conditions.moisture,
                conditions.temperature,
                score
            );
        }
        score
    }

    fn draw_ph(&self, soil_type: SoilType) -> PhReading {
        // Held only for the draw, never across an await
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        estimate_ph(soil_type, &mut *rng)
    }
}
