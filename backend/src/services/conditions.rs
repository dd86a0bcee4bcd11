//! Environmental conditions for a location
//!
//! Air humidity and temperature stand in for soil measurements.

use rust_decimal::Decimal;
use shared::{Availability, SoilConditions};

use crate::external::WeatherProvider;

/// Fraction of relative humidity taken as soil moisture
const HUMIDITY_TO_MOISTURE: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// `humidity / 100 * 0.8`, kept inside 0..=1
pub fn moisture_from_humidity(humidity_percent: Decimal) -> Decimal {
    (humidity_percent / Decimal::ONE_HUNDRED * HUMIDITY_TO_MOISTURE)
        .max(Decimal::ZERO)
        .min(Decimal::ONE)
}

/// Current conditions at a location, or the reason they could not be read
pub async fn fetch_conditions(
    provider: Option<&dyn WeatherProvider>,
    latitude: Decimal,
    longitude: Decimal,
) -> Availability<SoilConditions> {
    let Some(provider) = provider else {
        return Availability::unavailable("weather provider is not configured");
    };

    provider
        .current(latitude, longitude)
        .await
        .map(|weather| SoilConditions {
            moisture: moisture_from_humidity(weather.humidity_percent),
            temperature: weather.temperature_celsius,
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_moisture_from_humidity() {
        assert_eq!(
            moisture_from_humidity(Decimal::from(45)),
            Decimal::from_str("0.36").unwrap()
        );
        assert_eq!(
            moisture_from_humidity(Decimal::ONE_HUNDRED),
            Decimal::from_str("0.8").unwrap()
        );
        assert_eq!(moisture_from_humidity(Decimal::from(-5)), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_no_provider_is_unavailable() {
        let outcome = fetch_conditions(None, Decimal::ONE, Decimal::ONE).await;
        assert_eq!(
            outcome,
            Availability::unavailable("weather provider is not configured")
        );
    }
}
