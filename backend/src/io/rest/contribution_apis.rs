//! # REST API for Goal Contributions

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use log::info;
use shared::{ContributionListResponse, GoalContribution, MonthQuery, ProcessContributionsResponse};

use super::error::ApiResult;
use super::mappers::contribution_mapper::ContributionMapper;
use crate::domain::models::Period;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contributions))
        .route("/process", post(process_contributions))
        .route("/goal/:id", get(list_goal_contributions))
}

pub async fn list_contributions(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<ContributionListResponse>> {
    info!("GET /api/contributions - query: {:?}", query);
    let period = Period::new(query.month, query.year)?;

    let store = state.store.lock().await;
    Ok(Json(ContributionListResponse {
        month: period.month,
        year: period.year,
        contributions: ContributionMapper::to_dto_list(store.list_contributions_for_month(period)),
    }))
}

pub async fn list_goal_contributions(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> ApiResult<Json<Vec<GoalContribution>>> {
    info!("GET /api/contributions/goal/{}", goal_id);
    let store = state.store.lock().await;
    Ok(Json(ContributionMapper::to_dto_list(
        store.contributions_for_goal(&goal_id)?,
    )))
}

/// Fund active goals for the given month. Safe to call repeatedly.
pub async fn process_contributions(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<ProcessContributionsResponse>> {
    info!("POST /api/contributions/process - query: {:?}", query);
    let period = Period::new(query.month, query.year)?;

    let mut store = state.store.lock().await;
    let result = store.process_month(period).await?;

    Ok(Json(ProcessContributionsResponse {
        month: result.period.month,
        year: result.period.year,
        created: ContributionMapper::to_dto_list(&result.created),
        available_balance: result.available_balance,
    }))
}
