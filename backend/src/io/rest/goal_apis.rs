//! # REST API for Goal Management
//!
//! Endpoints for creating, listing, updating, pausing and deleting goals.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use log::info;
use shared::{CreateGoalRequest, DeleteGoalResponse, GoalListResponse, GoalView};

use super::error::ApiResult;
use super::mappers::goal_mapper::GoalMapper;
use crate::AppState;

/// Create a router for goal related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goals).post(create_goal))
        .route("/:id", put(update_goal).delete(delete_goal))
        .route("/:id/toggle", post(toggle_goal))
}

/// Goals in creation order, which is also their funding priority
pub async fn list_goals(State(state): State<AppState>) -> Json<GoalListResponse> {
    info!("GET /api/goals");
    let store = state.store.lock().await;
    Json(GoalListResponse {
        goals: GoalMapper::to_view_list(store.list_goals()),
    })
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(request): Json<CreateGoalRequest>,
) -> ApiResult<(StatusCode, Json<GoalView>)> {
    info!("POST /api/goals - request: {:?}", request);
    let mut store = state.store.lock().await;
    let goal = store.add_goal(GoalMapper::to_create_command(request)).await?;
    state.reprocess.notify();

    Ok((StatusCode::CREATED, Json(GoalMapper::to_view(&goal))))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateGoalRequest>,
) -> ApiResult<Json<GoalView>> {
    info!("PUT /api/goals/{} - request: {:?}", id, request);
    let mut store = state.store.lock().await;
    let goal = store
        .update_goal(GoalMapper::to_update_command(id, request))
        .await?;
    state.reprocess.notify();

    Ok(Json(GoalMapper::to_view(&goal)))
}

/// Pause an active goal or resume a paused one
pub async fn toggle_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GoalView>> {
    info!("POST /api/goals/{}/toggle", id);
    let mut store = state.store.lock().await;
    let goal = store.toggle_goal_active(&id).await?;
    state.reprocess.notify();

    Ok(Json(GoalMapper::to_view(&goal)))
}

/// Delete a goal and all of its contributions
pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteGoalResponse>> {
    info!("DELETE /api/goals/{}", id);
    let mut store = state.store.lock().await;
    let result = store.delete_goal(&id).await?;
    state.reprocess.notify();

    Ok(Json(DeleteGoalResponse {
        goal_id: result.goal_id,
        removed_contributions: result.removed_contributions,
        success_message: result.success_message,
    }))
}
