use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::handler::handle_survey_request;
use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::SurveyContext;

/// Request body for a natural-language survey request
#[derive(Debug, Deserialize)]
pub struct SurveyRequest {
    pub input: String,
    pub user_id: Option<String>,
}

/// Response carrying the agents' final answer
#[derive(Debug, Serialize, Deserialize)]
pub struct SurveyRequestResponse {
    pub session_id: Uuid,
    pub output: String,
}

/// Run a request through the survey agents
///
/// POST /api/survey-requests
pub async fn submit_request(
    State(state): State<AppState>,
    Json(req): Json<SurveyRequest>,
) -> Result<Json<SurveyRequestResponse>, ApiError> {
    if req.input.trim().is_empty() {
        return Err(ApiError::bad_request("input must not be empty"));
    }

    let context = SurveyContext::new(req.user_id);
    let session_id = context.session_id;
    let output = handle_survey_request(
        state.runtime.as_ref(),
        &req.input,
        state.tools.clone(),
        context,
    )
    .await;

    Ok(Json(SurveyRequestResponse { session_id, output }))
}
