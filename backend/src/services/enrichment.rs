//! Narrative enrichment from a generative text model
//!
//! The model is asked for a fixed JSON shape. Its answer is free text, so the
//! first balanced `{...}` object is cut out and parsed. Every field is
//! optional; the aggregator falls back to the static tables field by field.

use std::sync::Arc;

use serde::Deserialize;
use shared::{Availability, GpsCoordinates, SoilConditions, SoilType};

use crate::external::TextGenerator;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedReport {
    pub detailed_analysis: Option<DetailedAnalysis>,
    pub seasonal_advice: Option<SeasonalAdvice>,
    pub improvement_strategies: Option<ImprovementStrategies>,
    pub sustainable_practices: Option<SustainablePractices>,
    pub crop_recommendations: Option<CropRecommendations>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub characteristics: Option<Vec<String>>,
    pub health_status: Option<String>,
    pub environmental_impact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalAdvice {
    pub recommended_crops: Option<Vec<String>>,
    pub timing: Option<String>,
    pub challenges: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementStrategies {
    pub immediate_actions: Option<Vec<String>>,
    pub long_term_plan: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainablePractices {
    pub water_management: Option<String>,
    pub soil_conservation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendations {
    pub recommended: Option<Vec<String>>,
    pub avoid: Option<Vec<String>>,
}

fn present(text: &Option<String>) -> Option<String> {
    text.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

fn present_all(items: &Option<Vec<String>>) -> Vec<String> {
    items
        .iter()
        .flatten()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

impl EnrichedReport {
    /// Soil characteristics, empty when the model gave none
    pub fn characteristics(&self) -> Vec<String> {
        present_all(
            &self
                .detailed_analysis
                .as_ref()
                .and_then(|d| d.characteristics.clone()),
        )
    }

    pub fn recommended_crops(&self) -> Vec<String> {
        present_all(
            &self
                .crop_recommendations
                .as_ref()
                .and_then(|c| c.recommended.clone()),
        )
    }

    /// Timing, challenges, immediate actions, long-term plan, water
    /// management and soil conservation, in that order
    pub fn recommendations(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(seasonal) = &self.seasonal_advice {
            lines.extend(present(&seasonal.timing));
            lines.extend(present(&seasonal.challenges));
        }
        if let Some(strategies) = &self.improvement_strategies {
            lines.extend(present_all(&strategies.immediate_actions));
            lines.extend(present(&strategies.long_term_plan));
        }
        if let Some(practices) = &self.sustainable_practices {
            lines.extend(present(&practices.water_management));
            lines.extend(present(&practices.soil_conservation));
        }

        lines
    }
}

/// Prompt asking for the report shape above
pub fn build_prompt(
    soil_type: SoilType,
    health_score: i32,
    conditions: &SoilConditions,
    coordinates: GpsCoordinates,
) -> String {
    format!(
        r#"Analyze the soil data and provide a JSON response with the following structure:
{{
  "detailedAnalysis": {{
    "characteristics": ["2-3 key characteristics of {soil} soil"],
    "healthStatus": "Brief health analysis (Score: {score}/100)",
    "environmentalImpact": "Impact of moisture ({moisture}) and temperature ({temperature}°C)"
  }},
  "seasonalAdvice": {{
    "recommendedCrops": ["2-3 best crops for current season"],
    "timing": "Brief timing recommendation",
    "challenges": "Key seasonal challenge to address"
  }},
  "improvementStrategies": {{
    "immediateActions": ["2-3 immediate actions needed"],
    "longTermPlan": "One key long-term improvement strategy"
  }},
  "sustainablePractices": {{
    "waterManagement": "One key water management tip",
    "soilConservation": "One key soil conservation method"
  }},
  "cropRecommendations": {{
    "recommended": ["3-4 best-suited crops"],
    "avoid": ["2-3 crops to avoid"]
  }}
}}

The sample was taken at latitude {lat}, longitude {lon}.
Keep each text item under 15 words. Ensure valid JSON format."#,
        soil = soil_type,
        score = health_score,
        moisture = conditions.moisture.normalize(),
        temperature = conditions.temperature.normalize(),
        lat = coordinates.latitude,
        lon = coordinates.longitude,
    )
}

/// First balanced `{...}` object in `text`. Braces inside JSON strings are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a model answer into a report
pub fn parse_enrichment(text: &str) -> Availability<EnrichedReport> {
    let Some(json) = extract_json_object(text) else {
        return Availability::unavailable("no JSON object in response");
    };

    serde_json::from_str::<EnrichedReport>(json)
        .map_err(|e| format!("malformed JSON: {}", e))
        .into()
}

/// Asks the text generator for a narrative report
#[derive(Clone, Default)]
pub struct NarrativeEnricher {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl NarrativeEnricher {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub async fn enrich(
        &self,
        soil_type: SoilType,
        health_score: i32,
        conditions: &SoilConditions,
        coordinates: GpsCoordinates,
    ) -> Availability<EnrichedReport> {
        let Some(generator) = &self.generator else {
            return Availability::unavailable("text generator is not configured");
        };

        let prompt = build_prompt(soil_type, health_score, conditions, coordinates);
        match generator.generate(&prompt).await {
            Ok(text) => parse_enrichment(&text),
            Err(e) => Availability::unavailable(e.to_string()),
        }
    }
}

impl std::fmt::Debug for NarrativeEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeEnricher")
            .field("configured", &self.generator.is_some())
            .finish()
    }
}
