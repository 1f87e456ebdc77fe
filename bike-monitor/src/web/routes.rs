//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{error, info};

use crate::cache::QueryError;
use crate::domain::DEFAULT_RANKING_LIMIT;
use crate::ingest::CycleError;

use super::dto::*;
use super::state::AppState;

/// Upper bound on `?limit=` for the ranking endpoint.
const MAX_RANKING_LIMIT: usize = 100;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations/latest", get(latest_stations))
        .route("/api/ranking", get(ranking))
        .route("/api/ingest", post(ingest))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Every station from the most recent cycle, with network totals.
async fn latest_stations(State(state): State<AppState>) -> Result<Json<LatestResponse>, AppError> {
    let view = state.queries.latest().await?;
    Ok(Json(LatestResponse::from_view(&view)))
}

/// Top stations by mean available bikes over the whole history.
async fn ranking(
    State(state): State<AppState>,
    Query(req): Query<RankingRequest>,
) -> Result<Json<RankingResponse>, AppError> {
    let limit = req
        .limit
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .clamp(1, MAX_RANKING_LIMIT);

    let entries = state.queries.ranking(limit).await?;

    Ok(Json(RankingResponse {
        limit,
        entries: entries.as_ref().clone(),
    }))
}

/// Run one ingestion cycle now.
async fn ingest(State(state): State<AppState>) -> Result<Json<IngestResponse>, AppError> {
    let report = state.scheduler.trigger().await?;

    // New rows only matter to the cache when something was written.
    if report.inserted > 0 {
        state.queries.invalidate_all();
    }
    info!(inserted = report.inserted, "on-demand ingestion succeeded");

    Ok(Json(report.into()))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// The upstream API could not be reached or returned garbage
    BadGateway { message: String },
    Internal { message: String },
}

impl From<CycleError> for AppError {
    fn from(e: CycleError) -> Self {
        match e {
            CycleError::NetworkFailure(_) => AppError::BadGateway {
                message: e.to_string(),
            },
            CycleError::StorageFailure(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        error!(status = status.as_u16(), %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
