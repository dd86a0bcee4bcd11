//! Soil scoring heuristics
//!
//! Pure estimators for the health score, nutrient levels and pH. All
//! arithmetic is done in `Decimal` so that textbook inputs such as
//! `moisture = 0.3` land exactly on the expected integers.

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{HealthStatus, NutrientLevels, PhReading, PhStatus, SoilConditions, SoilType};

const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
const IDEAL_TEMPERATURE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
const MOISTURE_WEIGHT: Decimal = Decimal::from_parts(6, 0, 0, false, 1);
const TEMPERATURE_WEIGHT: Decimal = Decimal::from_parts(4, 0, 0, false, 1);

/// Resolution of the uniform pH draw
const PH_DRAW_STEPS: i64 = 1_000_000;

/// Round half up, i.e. `floor(x + 0.5)`, so -2.5 becomes -2 and 2.5 becomes 3.
/// Values outside `i32` saturate.
fn round_half_up(value: Decimal) -> i32 {
    value
        .saturating_add(HALF)
        .floor()
        .to_i32()
        .unwrap_or(if value.is_sign_negative() {
            i32::MIN
        } else {
            i32::MAX
        })
}

// ============================================================================
// Health Score
// ============================================================================

/// Unclamped health score.
///
/// Moisture is ideal at 0.5 and temperature at 20°C; the two partial scores
/// are weighted 60/40. Dry soil or heat pushes this below zero.
pub fn raw_health_score(moisture: Decimal, temperature: Decimal) -> i32 {
    // Out-of-range inputs saturate
    let penalty = |value: Decimal, ideal: Decimal, per_unit: i64| {
        value
            .saturating_sub(ideal)
            .saturating_mul(Decimal::from(per_unit))
            .abs()
    };
    let moisture_score = Decimal::ONE_HUNDRED.saturating_sub(penalty(moisture, HALF, 200));
    let temp_score =
        Decimal::ONE_HUNDRED.saturating_sub(penalty(temperature, IDEAL_TEMPERATURE, 5));

    round_half_up(
        moisture_score
            .saturating_mul(MOISTURE_WEIGHT)
            .saturating_add(temp_score.saturating_mul(TEMPERATURE_WEIGHT)),
    )
}

/// Health score clamped to 0..=100
pub fn health_score(moisture: Decimal, temperature: Decimal) -> i32 {
    raw_health_score(moisture, temperature).clamp(0, 100)
}

/// Health score for a set of conditions together with its band
pub fn assess_health(conditions: &SoilConditions) -> (i32, HealthStatus) {
    let score = health_score(conditions.moisture, conditions.temperature);
    (score, HealthStatus::from_score(score))
}

// ============================================================================
// Nutrients
// ============================================================================

impl SoilType {
    /// Base nitrogen/phosphorus/potassium percentages at ideal moisture
    pub fn base_nutrients(&self) -> NutrientLevels {
        let (nitrogen, phosphorus, potassium) = match self {
            SoilType::Clay => (40, 30, 45),
            SoilType::Sandy => (20, 15, 25),
            SoilType::Loamy => (45, 40, 50),
            SoilType::Silty => (35, 35, 40),
            SoilType::Peaty => (50, 25, 30),
            SoilType::Unknown => (30, 25, 35),
        };
        NutrientLevels {
            nitrogen,
            phosphorus,
            potassium,
        }
    }

    /// Typical (min, max) pH range
    pub fn ph_range(&self) -> (Decimal, Decimal) {
        let (min, max) = match self {
            SoilType::Sandy => ((55, 1), (65, 1)),
            SoilType::Peaty => ((45, 1), (55, 1)),
            SoilType::Clay | SoilType::Loamy | SoilType::Silty | SoilType::Unknown => {
                ((60, 1), (70, 1))
            }
        };
        (Decimal::new(min.0, min.1), Decimal::new(max.0, max.1))
    }
}

/// Scale the base nutrients by `1 + (moisture - 0.5)`
pub fn nutrient_levels(soil_type: SoilType, moisture: Decimal) -> NutrientLevels {
    let base = soil_type.base_nutrients();
    let factor = Decimal::ONE.saturating_add(moisture.saturating_sub(HALF));
    let scale = |value: i32| round_half_up(Decimal::from(value).saturating_mul(factor));

    NutrientLevels {
        nitrogen: scale(base.nitrogen),
        phosphorus: scale(base.phosphorus),
        potassium: scale(base.potassium),
    }
}

// ============================================================================
// pH
// ============================================================================

/// Draw a pH uniformly inside the type's range, rounded to one decimal.
///
/// The random source is supplied by the caller so tests can seed it.
pub fn estimate_ph<R: Rng + ?Sized>(soil_type: SoilType, rng: &mut R) -> PhReading {
    let (min, max) = soil_type.ph_range();
    let draw = Decimal::new(rng.gen_range(0..PH_DRAW_STEPS), 6);
    let ph_level = (min + draw * (max - min))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    PhReading {
        ph_level,
        ph_status: PhStatus::from_level(ph_level),
    }
}
