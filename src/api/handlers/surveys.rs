use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::agents::tools::SurveySummary;
use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::survey::Survey;
use crate::domain::SurveyContext;

/// List all surveys
///
/// GET /api/surveys
pub async fn list_surveys(
    State(state): State<AppState>,
) -> Result<Json<Vec<SurveySummary>>, ApiError> {
    let surveys = state.tools.list_surveys(&SurveyContext::default()).await?;
    Ok(Json(surveys))
}

/// Get a survey with its questions
///
/// GET /api/surveys/:id
pub async fn get_survey(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Survey>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::bad_request(format!("Invalid survey id: {}", id)))?;
    let survey = state.tools.survey(id).await?;
    Ok(Json(survey))
}
