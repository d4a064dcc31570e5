use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use marksearch_core::{DocId, EngineError, IndexStats, SearchEngine, SearchResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Deserialize)]
pub struct AddDocumentRequest {
    pub filename: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct AddDocumentResponse {
    pub document_id: DocId,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

pub fn build_app(engine: Arc<SearchEngine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/documents", post(add_document_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .with_state(AppState { engine })
        .layer(cors)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let k = params.k.max(1).min(100);
    let results = state.engine.search(&params.q, k).map_err(|err| {
        tracing::error!(%err, query = %params.q, "search failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "search failed".to_string())
    })?;
    Ok(Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total: results.len(),
        results,
    }))
}

pub async fn add_document_handler(
    State(state): State<AppState>,
    Json(req): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<AddDocumentResponse>), (StatusCode, String)> {
    match state.engine.add_document(&req.filename, &req.content) {
        Ok(document_id) => Ok((StatusCode::CREATED, Json(AddDocumentResponse { document_id }))),
        Err(err) => {
            tracing::error!(%err, filename = %req.filename, "ingestion failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to ingest {}", req.filename),
            ))
        }
    }
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match state.engine.document(doc_id) {
        Ok(doc) => Ok(Json(serde_json::json!({
            "document_id": doc.id,
            "filename": doc.filename,
            "word_count": doc.word_count,
            "created_at": doc.created_at,
            "content": doc.content,
        }))),
        Err(EngineError::NotFound(_)) => Err((StatusCode::NOT_FOUND, "not found".to_string())),
        Err(err) => {
            tracing::error!(%err, doc_id, "document read failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "document read failed".to_string(),
            ))
        }
    }
}

pub async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<IndexStats>, (StatusCode, String)> {
    state.engine.stats().map(Json).map_err(|err| {
        tracing::error!(%err, "stats failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "stats failed".to_string())
    })
}
