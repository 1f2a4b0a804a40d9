//! Defines routes for the photo search service.
//!
//! ## Structure
//! - `POST   /events` — ingest a storage-creation notification
//! - `GET    /search` — search photos by free text (`?q=`)
//! - `OPTIONS /search` — CORS preflight
//! - `GET    /healthz`, `GET /readyz` — probes
//!
//! The router carries shared state (`AppState`) to all handlers.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        photo_handlers::{ingest_event, search_photos, search_preflight},
    },
    services::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all service routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // ingestion trigger
        .route("/events", post(ingest_event))
        // query endpoint
        .route("/search", get(search_photos).options(search_preflight))
}
