use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use tracing::warn;

use finplan_core::{CompletionResponse, GeneratePlanRequest};
use finplan_logging::{LogEvent, RequestKind};

use super::error::ApiError;
use super::AppState;

/// `POST /api/completions`
pub async fn generate_plan(
    State(state): State<AppState>,
    Json(request): Json<GeneratePlanRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let start = Instant::now();
    let result = state.completions.handle(&request).await;

    let outcome = result.map(Json).map_err(|e| {
        warn!(error = %e, "Plan generation failed");
        ApiError::from(&e)
    });

    state.logger.log(&LogEvent::ProxyCall {
        kind: RequestKind::Plan,
        status: outcome
            .as_ref()
            .map(|_| 200)
            .unwrap_or_else(|e| e.status().as_u16()),
        duration_secs: start.elapsed().as_secs_f64(),
    });

    outcome
}
