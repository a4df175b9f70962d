mod completions;
mod error;
mod questions;

use std::sync::Arc;

use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use finplan_core::{CompletionProxy, FollowUpProxy};
use finplan_logging::Logger;

#[derive(Clone)]
pub struct AppState {
    pub completions: Arc<CompletionProxy>,
    pub questions: Arc<FollowUpProxy>,
    pub logger: Arc<Logger>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/completions", post(completions::generate_plan))
        .route("/api/questions", post(questions::follow_up))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "template_version": finplan_prompts::TEMPLATE_VERSION,
    }))
}
