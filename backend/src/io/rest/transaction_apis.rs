//! # REST API for Transactions
//!
//! Listing is per month: a recurring credit expense shows up in every month
//! of its window.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use log::info;
use shared::{
    CreateTransactionRequest, DeleteTransactionResponse, MonthQuery, Transaction,
    TransactionListResponse,
};

use super::error::ApiResult;
use super::mappers::transaction_mapper::TransactionMapper;
use crate::domain::models::Period;
use crate::AppState;

/// Create a router for transaction related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/:id", put(update_transaction).delete(delete_transaction))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<TransactionListResponse>> {
    info!("GET /api/transactions - query: {:?}", query);
    let period = Period::new(query.month, query.year)?;

    let store = state.store.lock().await;
    Ok(Json(TransactionListResponse {
        month: period.month,
        year: period.year,
        transactions: TransactionMapper::to_dto_list(&store.list_transactions_for_month(period)),
    }))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    info!("POST /api/transactions - request: {:?}", request);
    let mut store = state.store.lock().await;
    let transaction = store
        .add_transaction(TransactionMapper::to_create_command(request))
        .await?;
    state.reprocess.notify();

    Ok((StatusCode::CREATED, Json(TransactionMapper::to_dto(&transaction))))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateTransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    info!("PUT /api/transactions/{} - request: {:?}", id, request);
    let mut store = state.store.lock().await;
    let transaction = store
        .update_transaction(TransactionMapper::to_update_command(id, request))
        .await?;
    state.reprocess.notify();

    Ok(Json(TransactionMapper::to_dto(&transaction)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteTransactionResponse>> {
    info!("DELETE /api/transactions/{}", id);
    let mut store = state.store.lock().await;
    store.delete_transaction(&id).await?;
    state.reprocess.notify();

    Ok(Json(DeleteTransactionResponse {
        transaction_id: id,
        success_message: "Transaction deleted".to_string(),
    }))
}
