//! Analysis pipeline tests
//!
//! Runs the pipeline against in-memory providers and stores:
//! - Fallback conditions when the weather provider fails
//! - Per-field merge of the generated narrative with the static tables
//! - Score and pH bounds for any input

mod common;

use std::sync::Arc;

use proptest::prelude::*;
use shared::{HealthStatus, PhStatus, SoilType};
use uuid::Uuid;

use common::*;
use soilsense_backend::error::AppError;
use soilsense_backend::external::{TextGenerator, WeatherProvider};
use soilsense_backend::store::AnalysisStore;

const IMAGE_URL: &str = "https://images.test/soilsense/field.jpg";

fn weather(humidity: &str, temperature: &str) -> Option<Arc<dyn WeatherProvider>> {
    Some(Arc::new(FakeWeather::reporting(humidity, temperature)))
}

fn generator(text: &str) -> Option<Arc<dyn TextGenerator>> {
    Some(Arc::new(FakeGenerator::answering(text)))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_weather_failure_uses_fallback_conditions() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let failing: Arc<dyn WeatherProvider> = Arc::new(FakeWeather::failing());
        let pipeline = pipeline(Some(failing), None, store.clone());

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("-1.2921"),
                dec("36.8219"),
                SoilType::Sandy,
            )
            .await
            .unwrap();

        assert_eq!(analysis.moisture, dec("0.5"));
        assert_eq!(analysis.temperature, dec("20"));
        assert_eq!(analysis.health_score, 100);
        assert_eq!(analysis.health_status, HealthStatus::Excellent);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_missing_weather_provider_uses_fallback_conditions() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let pipeline = pipeline(None, None, store);

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("10"),
                dec("20"),
                SoilType::Loamy,
            )
            .await
            .unwrap();

        assert_eq!(analysis.moisture, dec("0.5"));
        assert_eq!(analysis.temperature, dec("20"));
    }

    #[tokio::test]
    async fn test_sandy_soil_on_a_warm_day() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let pipeline = pipeline(weather("45", "30"), None, store);
        let user_id = Uuid::new_v4();

        let analysis = pipeline
            .analyze(
                user_id,
                IMAGE_URL.to_string(),
                dec("-1.2921"),
                dec("36.8219"),
                SoilType::Sandy,
            )
            .await
            .unwrap();

        // moisture 0.36: 72 * 0.6 + 50 * 0.4 = 63.2
        assert_eq!(analysis.moisture, dec("0.36"));
        assert_eq!(analysis.health_score, 63);
        assert_eq!(analysis.health_status, HealthStatus::Good);

        // base (20, 15, 25) scaled by 0.86
        assert_eq!(analysis.nitrogen, 17);
        assert_eq!(analysis.phosphorus, 13);
        assert_eq!(analysis.potassium, 22);

        assert!(analysis.ph_level >= dec("5.5") && analysis.ph_level <= dec("6.5"));
        assert_eq!(
            analysis.recommended_crops,
            vec!["Carrots", "Potatoes", "Lettuce", "Strawberries"]
        );
        assert_eq!(
            analysis.recommendations,
            vec![
                "Add compost to improve water retention",
                "Use mulch to prevent moisture loss",
            ]
        );
        assert_eq!(analysis.user_id, user_id);
        assert_eq!(analysis.image_url, IMAGE_URL);
        assert_eq!(analysis.latitude, Some(dec("-1.2921")));
        assert_eq!(analysis.longitude, Some(dec("36.8219")));
        assert_eq!(analysis.address, None);
    }

    #[tokio::test]
    async fn test_unparseable_narrative_falls_back_to_static_tables() {
        let store = Arc::new(MemoryAnalysisStore::default());
        // moisture 0.2 and 27°C: 40 * 0.6 + 65 * 0.4 = 50
        let pipeline = pipeline(
            weather("25", "27"),
            generator("I am sorry, I cannot analyze soil today."),
            store,
        );

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Clay,
            )
            .await
            .unwrap();

        assert_eq!(analysis.health_score, 50);
        assert_eq!(analysis.health_status, HealthStatus::Fair);
        assert_eq!(
            analysis.recommendations,
            vec![
                "Add organic matter to improve soil structure",
                "Consider using a balanced fertilizer",
                "Add gypsum to improve drainage",
                "Avoid working soil when wet",
            ]
        );
        assert_eq!(
            analysis.recommended_crops,
            vec!["Cabbage", "Broccoli", "Brussels Sprouts", "Beans"]
        );
        assert_eq!(
            analysis.soil_description,
            "This appears to be Clay soil with 20% moisture content at 27°C."
        );
    }

    #[tokio::test]
    async fn test_failing_generator_falls_back_to_static_tables() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let failing: Arc<dyn TextGenerator> = Arc::new(FakeGenerator::failing());
        let pipeline = pipeline(weather("62.5", "20"), Some(failing), store);

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Peaty,
            )
            .await
            .unwrap();

        assert_eq!(analysis.health_score, 100);
        assert_eq!(
            analysis.recommendations,
            vec!["Monitor pH levels regularly", "Add lime if soil is too acidic"]
        );
    }

    #[tokio::test]
    async fn test_partial_narrative_replaces_only_present_fields() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let narrative = r#"Here is the report:
```json
{
  "detailedAnalysis": {
    "characteristics": ["Fine particles", "Holds water well"]
  },
  "cropRecommendations": {
    "recommended": ["Rice", "Taro"],
    "avoid": ["Cactus"]
  }
}
```"#;
        let pipeline = pipeline(weather("62.5", "20"), generator(narrative), store);

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Silty,
            )
            .await
            .unwrap();

        assert_eq!(analysis.soil_description, "Fine particles\nHolds water well");
        assert_eq!(analysis.recommended_crops, vec!["Rice", "Taro"]);
        // No advice sections in the narrative
        assert_eq!(
            analysis.recommendations,
            vec![
                "Improve drainage if needed",
                "Add organic matter to maintain structure",
            ]
        );
    }

    #[tokio::test]
    async fn test_full_narrative_recommendation_order() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let narrative = r#"{
  "seasonalAdvice": {"timing": "Plant after the long rains", "challenges": "Waterlogging"},
  "improvementStrategies": {"immediateActions": ["Add compost", " "], "longTermPlan": "Rotate legumes"},
  "sustainablePractices": {"waterManagement": "Drip irrigation", "soilConservation": "Cover crops"}
}"#;
        let pipeline = pipeline(weather("62.5", "20"), generator(narrative), store);

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Loamy,
            )
            .await
            .unwrap();

        assert_eq!(
            analysis.recommendations,
            vec![
                "Plant after the long rains",
                "Waterlogging",
                "Add compost",
                "Rotate legumes",
                "Drip irrigation",
                "Cover crops",
            ]
        );
        assert_eq!(
            analysis.recommended_crops,
            vec!["Tomatoes", "Corn", "Peppers", "Squash"]
        );
    }

    #[tokio::test]
    async fn test_unknown_soil_report() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let pipeline = pipeline(weather("62.5", "20"), None, store);

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Unknown,
            )
            .await
            .unwrap();

        assert_eq!(analysis.soil_type, SoilType::Unknown);
        assert_eq!(analysis.recommended_crops, vec!["Grass", "Basic Vegetables"]);
        assert!(analysis.recommendations.is_empty());
        assert_eq!(
            analysis.soil_description,
            "This appears to be Unknown soil with 50% moisture content at 20°C."
        );
    }

    #[tokio::test]
    async fn test_extreme_conditions_clamp_to_zero() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let pipeline = pipeline(weather("0", "60"), None, store);

        let analysis = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Sandy,
            )
            .await
            .unwrap();

        assert_eq!(analysis.health_score, 0);
        assert_eq!(analysis.health_status, HealthStatus::Poor);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_returned() {
        let store = Arc::new(MemoryAnalysisStore::failing());
        let pipeline = pipeline(weather("45", "30"), None, store.clone());

        let result = pipeline
            .analyze(
                Uuid::new_v4(),
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Clay,
            )
            .await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_stored_record_is_listed_for_owner_only() {
        let store = Arc::new(MemoryAnalysisStore::default());
        let pipeline = pipeline(None, None, store.clone());
        let owner = Uuid::new_v4();

        let analysis = pipeline
            .analyze(
                owner,
                IMAGE_URL.to_string(),
                dec("0"),
                dec("0"),
                SoilType::Clay,
            )
            .await
            .unwrap();

        let listed = store.list_for_user(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, analysis.id);
        assert!(store.list_for_user(Uuid::new_v4()).await.unwrap().is_empty());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn known_soil_strategy() -> impl Strategy<Value = SoilType> {
    prop::sample::select(SoilType::KNOWN.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The stored score is always in 0..=100 and agrees with its band
    #[test]
    fn prop_health_score_in_range(
        humidity in 0u32..=100,
        tenths in -300i64..=600,
        soil_type in known_soil_strategy(),
    ) {
        let temperature = rust_decimal::Decimal::new(tenths, 1).to_string();
        let store = Arc::new(MemoryAnalysisStore::default());
        let pipeline = pipeline(weather(&humidity.to_string(), &temperature), None, store);

        let analysis = tokio_test::block_on(pipeline.analyze(
            Uuid::new_v4(),
            IMAGE_URL.to_string(),
            dec("0"),
            dec("0"),
            soil_type,
        ))
        .unwrap();

        prop_assert!((0..=100).contains(&analysis.health_score));
        prop_assert_eq!(analysis.health_status, HealthStatus::from_score(analysis.health_score));
    }

    /// The drawn pH stays inside the soil type's range with one decimal place
    #[test]
    fn prop_ph_within_soil_range(soil_type in known_soil_strategy()) {
        let store = Arc::new(MemoryAnalysisStore::default());
        let pipeline = pipeline(None, None, store);

        let analysis = tokio_test::block_on(pipeline.analyze(
            Uuid::new_v4(),
            IMAGE_URL.to_string(),
            dec("0"),
            dec("0"),
            soil_type,
        ))
        .unwrap();

        let (min, max) = soil_type.ph_range();
        prop_assert!(analysis.ph_level >= min && analysis.ph_level <= max);
        prop_assert!(analysis.ph_level.scale() <= 1);
        prop_assert_eq!(analysis.ph_status, PhStatus::from_level(analysis.ph_level));
    }
}
