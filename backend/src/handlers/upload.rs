//! Soil image upload handler
//!
//! Validates the form, classifies and stores the image, then runs the
//! analysis pipeline.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::{
    parse_coordinates, validate_image_size, validate_image_type, SoilAnalysis, SoilType,
    UploadRejection,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::analysis::detect_soil_type;
use crate::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub image_url: String,
    pub analysis_id: Uuid,
    pub soil_type: SoilType,
    pub message: String,
    pub analysis: SoilAnalysis,
}

/// Image part of the upload form
struct UploadedImage {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Raw upload form fields
#[derive(Default)]
struct UploadForm {
    image: Option<UploadedImage>,
    latitude: Option<String>,
    longitude: Option<String>,
}

fn form_error(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadRejection::TooLarge {
            limit_mb: limit / (1024 * 1024),
        }
        .into()
    } else {
        AppError::ValidationError(format!("Invalid form data: {}", e.body_text()))
    }
}

async fn read_form(mut multipart: Multipart, limit: usize) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "image" if form.image.is_none() => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await.map_err(|e| form_error(e, limit))?;
                form.image = Some(UploadedImage {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "latitude" => {
                form.latitude = Some(field.text().await.map_err(|e| form_error(e, limit))?);
            }
            "longitude" => {
                form.longitude = Some(field.text().await.map_err(|e| form_error(e, limit))?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Upload a soil photograph and analyze it
pub async fn upload_soil_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let limit = state.config.upload.max_file_bytes;
    let form = read_form(multipart, limit).await?;

    // Reject before any external call is made
    let image = form.image.ok_or(UploadRejection::MissingFile)?;
    validate_image_type(image.content_type.as_deref())?;
    validate_image_size(image.bytes.len(), limit)?;
    let coordinates = parse_coordinates(form.latitude.as_deref(), form.longitude.as_deref())?;

    let content_type = image
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    let soil_type = detect_soil_type(state.classifier.as_ref(), &image.bytes).await;

    let image_url = state
        .storage
        .store(&image.bytes, &image.filename, content_type)
        .await?;

    let analysis = state
        .pipeline
        .analyze(
            user.id,
            image_url.clone(),
            coordinates.latitude,
            coordinates.longitude,
            soil_type,
        )
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        image_url,
        analysis_id: analysis.id,
        soil_type: analysis.soil_type,
        message: "Upload successful".to_string(),
        analysis,
    }))
}
