//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::errors::{IndexerError, Result};
use crate::events::EventRecord;
use crate::summary::AccountSummary;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

/// Build the router with every route and middleware layer.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/accounts/:owner/events", get(get_account_events))
        .route("/accounts/:owner/summary", get(get_account_summary))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccountEventsResponse {
    pub owner: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /accounts/:owner/events`
///
/// Returns all indexed events for the given account owner.
pub async fn get_account_events(
    State(state): State<Arc<ApiState>>,
    Path(owner): Path<String>,
) -> Result<Json<AccountEventsResponse>> {
    let events = db::get_events_for_owner(&state.pool, &owner).await?;
    Ok(Json(AccountEventsResponse {
        owner,
        count: events.len(),
        events,
    }))
}

/// `GET /accounts/:owner/summary`
///
/// Per-asset balances and goal flags reconstructed from indexed events.
pub async fn get_account_summary(
    State(state): State<Arc<ApiState>>,
    Path(owner): Path<String>,
) -> Result<Json<AccountSummary>> {
    let events = db::get_events_for_owner(&state.pool, &owner).await?;
    if events.is_empty() {
        return Err(IndexerError::AccountNotFound(owner));
    }
    Ok(Json(AccountSummary::from_events(&owner, &events)?))
}

/// `GET /events`
///
/// Returns all indexed events across all accounts.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}
