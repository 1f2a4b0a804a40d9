//! HTTP handlers for photo ingestion and search.
//! Each handler is one linear pass over the external collaborators; the
//! degradation policy (which failures are fatal, which fall back) lives
//! here, visible at the call sites.

use crate::{
    errors::AppError,
    models::event::StorageEvent,
    models::search::PhotoResult,
    services::{
        AppState,
        ingest_service::{decode_object_key, merge_labels},
        search_service::fallback_keywords,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const CORS_ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,x-amz-meta-customLabels";

/// Query params accepted by `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Body of a successful ingestion response. Storage-event triggers discard
/// it; it exists for logs and manual invocation.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: String,
    pub bucket: String,
    pub key: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<PhotoResult>,
}

/// POST `/events` — ingest one storage-creation notification.
///
/// Label detection and metadata reads degrade to empty lists; only the
/// index write may fail the invocation, so the trigger system can retry.
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<StorageEvent>,
) -> Result<Response, AppError> {
    let record = event
        .records
        .first()
        .ok_or_else(|| AppError::bad_request("event contains no records"))?;
    let bucket = record.s3.bucket.name.clone();
    let key = decode_object_key(&record.s3.object.key);
    info!("processing image {}/{}", bucket, key);

    let auto_labels = match state.ingest.detect_labels(&bucket, &key).await {
        Ok(labels) => labels,
        Err(err) => {
            warn!("label detection failed for {}/{}: {}", bucket, key, err);
            Vec::new()
        }
    };
    let custom_labels = match state.ingest.custom_labels(&bucket, &key).await {
        Ok(labels) => labels,
        Err(err) => {
            warn!("metadata read failed for {}/{}: {}", bucket, key, err);
            Vec::new()
        }
    };
    let labels = merge_labels(auto_labels, custom_labels);

    state
        .ingest
        .index_photo(&bucket, &key, labels.clone())
        .await
        .map_err(|err| {
            AppError::bad_gateway(format!("indexing {}/{} failed: {}", bucket, key, err))
        })?;

    info!("indexed {}/{} with labels {:?}", bucket, key, labels);
    let body = IngestResponse {
        message: "Photo indexed successfully".into(),
        bucket,
        key,
        labels,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// GET `/search?q=` — search photos by free text.
///
/// Always answers 200 with CORS headers; a broken search degrades to an
/// empty result list and is visible only in logs.
pub async fn search_photos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let query = params.q.unwrap_or_default();
    if query.is_empty() {
        return Ok(search_response(Vec::new()));
    }

    let mut keywords = match state.search.intent_keywords(&query).await {
        Ok(keywords) => keywords,
        Err(err) => {
            warn!("intent recognition failed for {:?}: {}", query, err);
            Vec::new()
        }
    };
    if keywords.is_empty() {
        keywords = fallback_keywords(&query);
    }
    debug!("keywords for {:?}: {:?}", query, keywords);
    if keywords.is_empty() {
        return Ok(search_response(Vec::new()));
    }

    let results = match state.search.find_photos(&keywords).await {
        Ok(results) => results,
        Err(err) => {
            warn!("photo search failed for {:?}: {}", query, err);
            Vec::new()
        }
    };
    Ok(search_response(results))
}

/// OPTIONS `/search` — CORS preflight.
pub async fn search_preflight() -> Response {
    (StatusCode::NO_CONTENT, cors_headers()).into_response()
}

fn search_response(results: Vec<PhotoResult>) -> Response {
    (StatusCode::OK, cors_headers(), Json(SearchResults { results })).into_response()
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,OPTIONS"),
    );
    headers
}
