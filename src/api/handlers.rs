use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, warn};

use crate::api::{state::AppState, types::HealthResponse};
use crate::error::GridcastError;
use crate::forecast::{ForecastRequest, ForecastResponse};

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let artifact = state.service.artifact();
    Json(HealthResponse {
        status: "ok",
        model_ready: state.service.is_ready(),
        model_path: artifact.path.display().to_string(),
        feature_count: artifact.feature_names.len(),
        output_count: (!artifact.output_names.is_empty()).then(|| artifact.output_names.len()),
        last_error: artifact.load_error.clone(),
    })
}

/// POST {api_prefix}/forecast
pub async fn create_forecast(
    State(state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> std::result::Result<Json<ForecastResponse>, (StatusCode, String)> {
    match state.service.generate(&request) {
        Ok(response) => Ok(Json(response)),
        Err(GridcastError::ModelNotReady(msg)) => {
            warn!(error = %msg, "Forecast requested while model unavailable");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                "Model is not ready".to_string(),
            ))
        }
        Err(e) => {
            // Full detail stays in the logs; the caller gets an opaque 500.
            error!(error = %e, "Forecast generation failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate forecast".to_string(),
            ))
        }
    }
}
