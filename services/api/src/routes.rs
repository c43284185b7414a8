use crate::infra::{AppState, SharedNormalizer};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use merchant_ledger::error::AppError;
use merchant_ledger::workflows::transactions::{TransactionImporter, TransactionRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct NormalizeRequest {
    pub(crate) merchants: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NormalizeResponse {
    pub(crate) results: Vec<NormalizedMerchant>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NormalizedMerchant {
    pub(crate) raw: Value,
    pub(crate) normalized: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) source_account: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImportResponse {
    pub(crate) imported: usize,
    pub(crate) duplicates: usize,
    pub(crate) records: Vec<TransactionRecord>,
}

/// Merchant and transaction endpoints backed by one shared normalizer.
pub(crate) fn merchant_router(normalizer: SharedNormalizer) -> Router {
    Router::new()
        .route("/api/v1/merchants/normalize", post(normalize_endpoint))
        .route("/api/v1/transactions/import", post(import_endpoint))
        .with_state(normalizer)
}

pub(crate) fn with_service_routes(normalizer: SharedNormalizer) -> Router {
    merchant_router(normalizer)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn normalize_endpoint(
    State(normalizer): State<SharedNormalizer>,
    Json(payload): Json<NormalizeRequest>,
) -> Json<NormalizeResponse> {
    let results = payload
        .merchants
        .into_iter()
        .map(|raw| NormalizedMerchant {
            normalized: normalizer.normalize_value(&raw),
            raw,
        })
        .collect();

    Json(NormalizeResponse { results })
}

pub(crate) async fn import_endpoint(
    State(normalizer): State<SharedNormalizer>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let ImportRequest {
        csv,
        source_account,
    } = payload;

    let importer = TransactionImporter::new(&normalizer);
    let importer = match source_account.filter(|account| !account.trim().is_empty()) {
        Some(account) => importer.with_source_account(account),
        None => importer,
    };

    let import = importer.import_reader(Cursor::new(csv.into_bytes()))?;

    Ok(Json(ImportResponse {
        imported: import.records.len(),
        duplicates: import.duplicates,
        records: import.records,
    }))
}
