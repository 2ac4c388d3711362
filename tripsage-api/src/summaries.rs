use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use tripsage_core::summary::TripSummary;

use crate::error::{AppError, BodyJson};
use crate::llm::{fallback_content, SummaryRequest};
use crate::middleware::bearer_identity;
use crate::state::AppState;

const DEFAULT_TRIP_DAYS: u32 = 3;
const MAX_TRIP_DAYS: u32 = 30;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summaries/generate", post(generate_summary))
        .route("/summaries/{id}", get(get_summary))
}

#[derive(Debug, Deserialize)]
struct GenerateSummaryRequest {
    destination: Option<String>,
    days: Option<u32>,
    budget: Option<f64>,
    interests: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    summary: TripSummary,
}

/// Anonymous summaries are allowed, so authentication here is optional:
/// a valid bearer token attaches the summary to the caller's account.
async fn generate_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    BodyJson(req): BodyJson<GenerateSummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let destination = req
        .destination
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            AppError::ValidationError("missing required field: destination".to_string())
        })?
        .to_string();

    let identity = bearer_identity(&state, &headers);
    let request = SummaryRequest {
        destination: destination.clone(),
        days: req.days.unwrap_or(DEFAULT_TRIP_DAYS).clamp(1, MAX_TRIP_DAYS),
        budget: req.budget.filter(|b| b.is_finite() && *b > 0.0),
        interests: req.interests.unwrap_or_default(),
    };

    // Upstream failure degrades to the static payload instead of failing
    // the request; the flag tells the client the data is synthetic.
    let (content, is_fallback_data) = match state.generator.generate(&request).await {
        Ok(content) => (content, false),
        Err(e) => {
            warn!(destination = %destination, error = %e, "summary generation failed, using fallback");
            (fallback_content(&request), true)
        }
    };

    let summary = TripSummary::new(
        identity.map(|i| i.user_id),
        destination,
        content,
        is_fallback_data,
    );
    state.summaries.insert(&summary).await?;

    Ok(Json(SummaryResponse { summary }))
}

async fn get_summary(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = state
        .summaries
        .find(&key)
        .await?
        .ok_or_else(|| AppError::NotFoundError("summary not found".to_string()))?;

    Ok(Json(SummaryResponse { summary }))
}
