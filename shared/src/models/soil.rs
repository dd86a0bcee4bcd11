//! Soil analysis models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dominant soil composition as reported by the image classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SoilType {
    Clay,
    Sandy,
    Loamy,
    Silty,
    Peaty,
    Unknown,
}

impl SoilType {
    /// Every type with an entry in the estimator tables
    pub const KNOWN: [SoilType; 5] = [
        SoilType::Clay,
        SoilType::Sandy,
        SoilType::Loamy,
        SoilType::Silty,
        SoilType::Peaty,
    ];

    /// Parse a classifier label. Matching ignores case, surrounding whitespace
    /// and a trailing "soil"; anything else is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let lowered = label.trim().to_ascii_lowercase();
        let name = lowered
            .strip_suffix("soil")
            .map(str::trim_end)
            .unwrap_or(lowered.as_str());

        match name {
            "clay" => SoilType::Clay,
            "sandy" | "sand" => SoilType::Sandy,
            "loamy" | "loam" => SoilType::Loamy,
            "silty" | "silt" => SoilType::Silty,
            "peaty" | "peat" => SoilType::Peaty,
            _ => SoilType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Clay => "Clay",
            SoilType::Sandy => "Sandy",
            SoilType::Loamy => "Loamy",
            SoilType::Silty => "Silty",
            SoilType::Peaty => "Peaty",
            SoilType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health band derived from the health score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthStatus {
    /// Band a score: >= 80 Excellent, >= 60 Good, >= 40 Fair, otherwise Poor
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 80 => HealthStatus::Excellent,
            s if s >= 60 => HealthStatus::Good,
            s if s >= 40 => HealthStatus::Fair,
            _ => HealthStatus::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Fair => "Fair",
            HealthStatus::Poor => "Poor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Excellent" => Some(HealthStatus::Excellent),
            "Good" => Some(HealthStatus::Good),
            "Fair" => Some(HealthStatus::Fair),
            "Poor" => Some(HealthStatus::Poor),
            _ => None,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acidity band derived from the pH level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PhStatus {
    Acidic,
    Neutral,
    Alkaline,
}

impl PhStatus {
    /// < 6.0 is Acidic, > 7.0 is Alkaline, the closed range between is Neutral
    pub fn from_level(level: Decimal) -> Self {
        if level < Decimal::from(6) {
            PhStatus::Acidic
        } else if level > Decimal::from(7) {
            PhStatus::Alkaline
        } else {
            PhStatus::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhStatus::Acidic => "Acidic",
            PhStatus::Neutral => "Neutral",
            PhStatus::Alkaline => "Alkaline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Acidic" => Some(PhStatus::Acidic),
            "Neutral" => Some(PhStatus::Neutral),
            "Alkaline" => Some(PhStatus::Alkaline),
            _ => None,
        }
    }
}

impl std::fmt::Display for PhStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated nutrient availability, in percent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutrientLevels {
    pub nitrogen: i32,
    pub phosphorus: i32,
    pub potassium: i32,
}

/// Estimated pH with its band
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhReading {
    pub ph_level: Decimal,
    pub ph_status: PhStatus,
}

/// Ambient conditions used as a soil proxy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SoilConditions {
    /// Moisture fraction, 0-1
    pub moisture: Decimal,
    /// Air temperature in °C
    pub temperature: Decimal,
}

impl SoilConditions {
    /// Used whenever the weather provider cannot be reached
    pub const FALLBACK: SoilConditions = SoilConditions {
        moisture: Decimal::from_parts(5, 0, 0, false, 1),
        temperature: Decimal::from_parts(20, 0, 0, false, 0),
    };
}

/// A persisted soil health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilAnalysis {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub soil_type: SoilType,
    pub soil_description: String,
    pub health_score: i32,
    pub health_status: HealthStatus,
    pub ph_level: Decimal,
    pub ph_status: PhStatus,
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

/// A fully assembled report waiting to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewSoilAnalysis {
    pub user_id: Uuid,
    pub image_url: String,
    pub soil_type: SoilType,
    pub soil_description: String,
    pub health_score: i32,
    pub health_status: HealthStatus,
    pub ph: PhReading,
    pub recommended_crops: Vec<String>,
    pub recommendations: Vec<String>,
    pub nutrients: NutrientLevels,
    pub conditions: SoilConditions,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}
