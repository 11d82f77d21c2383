//! # REST API for Monthly Summary, Salary and Settings

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use log::info;
use shared::{FinanceSettings, MonthQuery, MonthlySummary, SalaryResponse, SetSalaryRequest};

use super::error::ApiResult;
use super::mappers::summary_mapper::SummaryMapper;
use crate::domain::commands::settings::UpdateSettingsCommand;
use crate::domain::models::Period;
use crate::AppState;

pub fn summary_router() -> Router<AppState> {
    Router::new().route("/", get(get_summary))
}

pub fn salary_router() -> Router<AppState> {
    Router::new().route("/", get(get_salary).put(set_salary))
}

pub fn settings_router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

/// Totals, balance and available balance for one month
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<MonthlySummary>> {
    info!("GET /api/summary - query: {:?}", query);
    let period = Period::new(query.month, query.year)?;

    let store = state.store.lock().await;
    Ok(Json(SummaryMapper::to_dto(&store.monthly_summary(period))))
}

pub async fn get_salary(State(state): State<AppState>) -> Json<SalaryResponse> {
    info!("GET /api/salary");
    let store = state.store.lock().await;
    Json(SalaryResponse {
        salary: store.salary(),
    })
}

pub async fn set_salary(
    State(state): State<AppState>,
    Json(request): Json<SetSalaryRequest>,
) -> ApiResult<Json<SalaryResponse>> {
    info!("PUT /api/salary - request: {:?}", request);
    let mut store = state.store.lock().await;
    store.set_salary(request.salary).await?;
    state.reprocess.notify();

    Ok(Json(SalaryResponse {
        salary: store.salary(),
    }))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<FinanceSettings> {
    info!("GET /api/settings");
    let store = state.store.lock().await;
    Json(SummaryMapper::settings_to_dto(&store.settings()))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<FinanceSettings>,
) -> ApiResult<Json<FinanceSettings>> {
    info!("PUT /api/settings - request: {:?}", request);
    let mut store = state.store.lock().await;
    let settings = store
        .update_settings(UpdateSettingsCommand {
            goal_contribution_day: request.goal_contribution_day,
        })
        .await?;
    state.reprocess.notify();

    Ok(Json(SummaryMapper::settings_to_dto(&settings)))
}
