//! Request handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use taskrank_core::task::parse_batch;
use taskrank_core::{ranking, RankedTask, ScoringContext, Strategy, Suggestion};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StrategyParams {
    pub strategy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub tasks: Vec<RankedTask>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StrategyParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Query(params) = query?;
    let strategy = params
        .strategy
        .as_deref()
        .map(Strategy::from_name)
        .unwrap_or(state.default_strategy);
    let batch = parse_batch(&body)?;
    debug!(count = batch.len(), strategy = %strategy, "analyze request");

    let today = state.clock.today();
    let ctx = ScoringContext::new(today, &state.calendar);
    let db = state.db.lock().await;
    let tasks = ranking::analyze(&db, batch, strategy, &ctx)?;
    Ok(Json(AnalyzeResponse { tasks }))
}

pub async fn suggest(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StrategyParams>, QueryRejection>,
) -> Result<Json<SuggestResponse>, ApiError> {
    let Query(params) = query?;
    if let Some(requested) = params.strategy.as_deref() {
        info!(requested, "suggest ignores strategy; stored scores are used");
    }
    let today = state.clock.today();
    let db = state.db.lock().await;
    let suggestions = ranking::suggest(&db, today)?;
    Ok(Json(SuggestResponse { suggestions }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
