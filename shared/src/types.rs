//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates supplied with an upload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Outcome of a best-effort call to an optional upstream.
///
/// `Unavailable` is not an error: the caller substitutes a fallback and keeps
/// going.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Availability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Availability::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    /// Convert into an `Option`, dropping the reason
    pub fn ok(self) -> Option<T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::Unavailable { .. } => None,
        }
    }

    /// Take the value or build a fallback from the reason
    pub fn unwrap_or_else(self, fallback: impl FnOnce(&str) -> T) -> T {
        match self {
            Availability::Available(value) => value,
            Availability::Unavailable { reason } => fallback(&reason),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Availability<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Availability::Available(value),
            Err(e) => Availability::unavailable(e.to_string()),
        }
    }
}
