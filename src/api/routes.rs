use axum::{routing::get, routing::post, Router};

use crate::api::handlers::{health, requests, surveys};
use crate::api::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Natural-language requests
        .route("/api/survey-requests", post(requests::submit_request))
        // Survey reads
        .route("/api/surveys", get(surveys::list_surveys))
        .route("/api/surveys/:id", get(surveys::get_survey))
        .with_state(state)
}
