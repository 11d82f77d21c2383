//! # REST API for Export and Import

use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use log::info;
use serde::Deserialize;
use shared::{ExportDocument, ImportResponse};

use super::error::ApiResult;
use crate::domain::models::Period;
use crate::domain::reprocess::local_today;
use crate::AppState;

/// Reference month of the export summary; the current month when omitted
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(export_data))
        .route("/import", post(import_data))
}

pub async fn export_data(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Json<ExportDocument>> {
    info!("GET /api/export - query: {:?}", query);
    let today = Period::of(local_today());
    let period = Period::new(
        query.month.unwrap_or(today.month),
        query.year.unwrap_or(today.year),
    )?;

    let store = state.store.lock().await;
    Ok(Json(state.export_service.export(&store, period, Utc::now())))
}

/// Replace all data with an exported document.
///
/// The body is parsed here rather than by an extractor so malformed JSON is
/// reported like any other rejected import.
pub async fn import_data(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    info!("POST /api/import - {} bytes", body.len());
    let request = state
        .export_service
        .parse_request(&body)
        .map_err(crate::domain::FinanceError::from)?;

    let mut store = state.store.lock().await;
    let result = state
        .export_service
        .import(&mut store, &request.document, request.confirm_overwrite)
        .await?;
    state.reprocess.notify();

    Ok(Json(ImportResponse {
        transaction_count: result.transaction_count,
        goal_count: result.goal_count,
        contribution_count: result.contribution_count,
        success_message: result.success_message,
    }))
}
