use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use tracing::warn;

use finplan_core::{CompletionResponse, FollowUpRequest};
use finplan_logging::{LogEvent, RequestKind};

use super::error::ApiError;
use super::AppState;

/// `POST /api/questions`
pub async fn follow_up(
    State(state): State<AppState>,
    Json(request): Json<FollowUpRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let start = Instant::now();
    let result = state.questions.handle(&request).await;

    let outcome = result.map(Json).map_err(|e| {
        warn!(error = %e, "Follow-up failed");
        ApiError::from(&e)
    });

    state.logger.log(&LogEvent::ProxyCall {
        kind: RequestKind::FollowUp,
        status: outcome
            .as_ref()
            .map(|_| 200)
            .unwrap_or_else(|e| e.status().as_u16()),
        duration_secs: start.elapsed().as_secs_f64(),
    });

    outcome
}
