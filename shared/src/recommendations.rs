//! Static agronomy tables used when no generated narrative is available

use rust_decimal::Decimal;

use crate::models::{SoilConditions, SoilType};

/// Score below which general soil-building advice is added
const LOW_HEALTH_THRESHOLD: i32 = 60;

impl SoilType {
    /// One-line description of the soil type
    pub fn description(&self) -> &'static str {
        match self {
            SoilType::Clay => "Dense and nutrient-rich soil that retains water well but can be heavy and difficult to work with.",
            SoilType::Sandy => "Light and well-draining soil that warms up quickly in spring but may not retain nutrients well.",
            SoilType::Loamy => "Ideal soil type with a good balance of sand, silt, and clay. Excellent for most plants.",
            SoilType::Silty => "Fertile soil with good water retention and easy to work with. Rich in nutrients.",
            SoilType::Peaty => "Acidic soil high in organic matter, excellent for specific acid-loving plants.",
            SoilType::Unknown => "Unknown soil type",
        }
    }
}

/// Crops that do well in the given soil type
pub fn recommended_crops(soil_type: SoilType) -> Vec<String> {
    let crops: &[&str] = match soil_type {
        SoilType::Clay => &["Cabbage", "Broccoli", "Brussels Sprouts", "Beans"],
        SoilType::Sandy => &["Carrots", "Potatoes", "Lettuce", "Strawberries"],
        SoilType::Loamy => &["Tomatoes", "Corn", "Peppers", "Squash"],
        SoilType::Silty => &["Roses", "Grass", "Most Vegetables", "Berry Plants"],
        SoilType::Peaty => &["Blueberries", "Rhododendrons", "Azaleas", "Heathers"],
        SoilType::Unknown => &["Grass", "Basic Vegetables"],
    };
    crops.iter().map(|c| c.to_string()).collect()
}

/// Management advice for a soil type at a given health score
pub fn generate_recommendations(soil_type: SoilType, health_score: i32) -> Vec<String> {
    let mut recommendations = Vec::new();

    if health_score < LOW_HEALTH_THRESHOLD {
        recommendations.push("Add organic matter to improve soil structure");
        recommendations.push("Consider using a balanced fertilizer");
    }

    match soil_type {
        SoilType::Clay => {
            recommendations.push("Add gypsum to improve drainage");
            recommendations.push("Avoid working soil when wet");
        }
        SoilType::Sandy => {
            recommendations.push("Add compost to improve water retention");
            recommendations.push("Use mulch to prevent moisture loss");
        }
        SoilType::Loamy => {
            recommendations.push("Maintain organic matter levels");
            recommendations.push("Regular crop rotation recommended");
        }
        SoilType::Silty => {
            recommendations.push("Improve drainage if needed");
            recommendations.push("Add organic matter to maintain structure");
        }
        SoilType::Peaty => {
            recommendations.push("Monitor pH levels regularly");
            recommendations.push("Add lime if soil is too acidic");
        }
        SoilType::Unknown => {}
    }

    recommendations.into_iter().map(String::from).collect()
}

/// Narrative used when no generated characteristics are available
pub fn describe_conditions(soil_type: SoilType, conditions: &SoilConditions) -> String {
    let moisture_percent = (conditions.moisture * Decimal::ONE_HUNDRED).normalize();
    format!(
        "This appears to be {} soil with {}% moisture content at {}°C.",
        soil_type,
        moisture_percent,
        conditions.temperature.normalize()
    )
}
