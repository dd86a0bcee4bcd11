//! Validation utilities for SoilSense
//!
//! Upload checks run before any external call is made, so everything here is
//! pure and shared with the browser build.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::types::GpsCoordinates;

/// Largest accepted soil photograph
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Why an upload was rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("No file provided")]
    MissingFile,

    #[error("File must be an image")]
    NotAnImage,

    #[error("File size must be less than {limit_mb}MB")]
    TooLarge { limit_mb: usize },

    #[error("Invalid location data: {field} is required")]
    MissingCoordinate { field: &'static str },

    #[error("Invalid location data: {field} must be a finite number")]
    InvalidCoordinate { field: &'static str },
}

impl UploadRejection {
    /// Name of the offending form field
    pub fn field(&self) -> &'static str {
        match self {
            UploadRejection::MissingFile
            | UploadRejection::NotAnImage
            | UploadRejection::TooLarge { .. } => "file",
            UploadRejection::MissingCoordinate { field }
            | UploadRejection::InvalidCoordinate { field } => *field,
        }
    }
}

// ============================================================================
// Upload Validations
// ============================================================================

/// Accept only `image/*` content types
pub fn validate_image_type(content_type: Option<&str>) -> Result<(), UploadRejection> {
    match content_type {
        Some(ct) if ct.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        _ => Err(UploadRejection::NotAnImage),
    }
}

/// Reject images larger than `limit` bytes
pub fn validate_image_size(size: usize, limit: usize) -> Result<(), UploadRejection> {
    if size > limit {
        return Err(UploadRejection::TooLarge {
            limit_mb: limit / (1024 * 1024),
        });
    }
    Ok(())
}

/// Parse one coordinate form value. Anything that is not a finite number is
/// rejected, including `NaN` and `inf`.
pub fn parse_coordinate(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Decimal, UploadRejection> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(UploadRejection::MissingCoordinate { field })?;

    if let Ok(value) = Decimal::from_str(raw) {
        return Ok(value);
    }

    // Scientific notation and other float spellings
    let value: f64 = raw
        .parse()
        .map_err(|_| UploadRejection::InvalidCoordinate { field })?;

    if !value.is_finite() {
        return Err(UploadRejection::InvalidCoordinate { field });
    }

    Decimal::from_f64(value).ok_or(UploadRejection::InvalidCoordinate { field })
}

/// Parse the latitude/longitude pair of an upload form
pub fn parse_coordinates(
    latitude: Option<&str>,
    longitude: Option<&str>,
) -> Result<GpsCoordinates, UploadRejection> {
    Ok(GpsCoordinates::new(
        parse_coordinate("latitude", latitude)?,
        parse_coordinate("longitude", longitude)?,
    ))
}

/// Keep only characters that are safe in a storage object name
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type() {
        assert!(validate_image_type(Some("image/png")).is_ok());
        assert!(validate_image_type(Some("IMAGE/JPEG")).is_ok());
        assert_eq!(
            validate_image_type(Some("application/pdf")),
            Err(UploadRejection::NotAnImage)
        );
        assert_eq!(validate_image_type(None), Err(UploadRejection::NotAnImage));
    }

    #[test]
    fn test_image_size_limit() {
        assert!(validate_image_size(MAX_UPLOAD_BYTES, MAX_UPLOAD_BYTES).is_ok());
        let err = validate_image_size(MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err, UploadRejection::TooLarge { limit_mb: 10 });
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[test]
    fn test_coordinates() {
        let coords = parse_coordinates(Some("13.7563"), Some(" 100.5018 ")).unwrap();
        assert_eq!(coords.latitude, Decimal::from_str("13.7563").unwrap());
        assert_eq!(coords.longitude, Decimal::from_str("100.5018").unwrap());

        assert_eq!(
            parse_coordinates(None, Some("1")),
            Err(UploadRejection::MissingCoordinate { field: "latitude" })
        );
        assert_eq!(
            parse_coordinates(Some("1"), Some("east")),
            Err(UploadRejection::InvalidCoordinate { field: "longitude" })
        );
        assert_eq!(
            parse_coordinates(Some("NaN"), Some("1")),
            Err(UploadRejection::InvalidCoordinate { field: "latitude" })
        );
        assert_eq!(
            parse_coordinates(Some("1"), Some("inf")),
            Err(UploadRejection::InvalidCoordinate { field: "longitude" })
        );
    }

    #[test]
    fn test_rejection_fields() {
        assert_eq!(UploadRejection::NotAnImage.field(), "file");
        assert_eq!(
            UploadRejection::InvalidCoordinate { field: "longitude" }.field(),
            "longitude"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my field (1).jpg"), "myfield1.jpg");
        assert_eq!(sanitize_filename("../../etc"), "....etc");
    }
}
