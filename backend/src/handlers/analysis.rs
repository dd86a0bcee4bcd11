//! Soil analysis read handlers

use axum::{
    extract::{Path, State},
    Json,
};
use shared::SoilAnalysis;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::AppState;

/// List the caller's analyses, newest first
pub async fn list_analyses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<SoilAnalysis>>> {
    let analyses = state.analyses.list_for_user(user.id).await?;
    Ok(Json(analyses))
}

/// Get one analysis owned by the caller
pub async fn get_analysis(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(analysis_id): Path<String>,
) -> AppResult<Json<SoilAnalysis>> {
    let not_found = || AppError::NotFound("Analysis".to_string());

    let id = Uuid::parse_str(&analysis_id).map_err(|_| not_found())?;
    let analysis = state.analyses.find(id).await?.ok_or_else(not_found)?;

    if analysis.user_id != user.id {
        tracing::warn!(
            "User {} requested analysis {} owned by another user",
            user.id,
            analysis.id
        );
        return Err(AppError::Forbidden(
            "You do not have access to this analysis".to_string(),
        ));
    }

    Ok(Json(analysis))
}
