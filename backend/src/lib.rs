//! # Fintra Backend
//!
//! Non-UI core of the Fintra personal finance tracker.
//!
//! - **Domain**: visibility rule, monthly aggregation, goal funding and the
//!   finance store that owns all data
//! - **Storage**: key-value adapters the store persists through
//! - **IO**: REST endpoints over the store
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (FinanceStore, engine)
//!     ↓
//! Storage Layer (KeyValueStore: SQLite, memory)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::BackendConfig;
use crate::domain::{ExportService, FinanceStore, ReprocessHandle, Reprocessor};
use crate::io::rest::{
    contribution_apis, export_apis, goal_apis, summary_apis, transaction_apis,
};
use crate::storage::{KeyValueStore, SqliteStore};

/// Main application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<FinanceStore>>,
    pub export_service: ExportService,
    pub reprocess: ReprocessHandle,
}

/// Open the configured database and build the application state
pub async fn initialize_backend(config: &BackendConfig) -> Result<AppState> {
    info!("Setting up database");
    let storage = SqliteStore::connect(&config.database_url).await?;

    build_state(Arc::new(storage), config.reprocess_debounce).await
}

/// Load the finance store from `storage` and start the reprocessing worker
pub async fn build_state(
    storage: Arc<dyn KeyValueStore>,
    reprocess_debounce: Duration,
) -> Result<AppState> {
    info!("Setting up domain model");
    let store = Arc::new(Mutex::new(FinanceStore::load(storage).await?));
    let (reprocess, _worker) = Reprocessor::new(store.clone(), reprocess_debounce).spawn();

    // Catch up on the current month in case it became due while stopped
    reprocess.notify();

    info!("Setting up application state");
    Ok(AppState {
        store,
        export_service: ExportService::new(),
        reprocess,
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow a local frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:8080"))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/summary", summary_apis::summary_router())
        .nest("/salary", summary_apis::salary_router())
        .nest("/settings", summary_apis::settings_router())
        .nest("/transactions", transaction_apis::router())
        .nest("/goals", goal_apis::router())
        .nest("/contributions", contribution_apis::router())
        .merge(export_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn setup_test() -> (Router, AppState) {
        let state = build_state(Arc::new(MemoryStore::new()), Duration::from_secs(3600))
            .await
            .expect("Failed to build state");
        (create_router(state.clone()), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_monthly_flow() {
        let (app, _) = setup_test().await;

        let (status, _) = send(&app, "PUT", "/api/salary", Some(json!({ "salary": 2000 }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, created) = send(
            &app,
            "POST",
            "/api/transactions",
            Some(json!({
                "description": "Laptop",
                "amount": 300,
                "date": "2024-01-20",
                "category": "expense",
                "type": "credit",
                "isRecurring": true,
                "dueDay": 10,
                "recurringMonths": 3,
                "startMonth": 1,
                "startYear": 2024
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["isRecurring"], true);

        for (month, expected) in [(1, 1), (3, 1), (4, 0)] {
            let (status, list) = send(
                &app,
                "GET",
                &format!("/api/transactions?month={}&year=2024", month),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(list["transactions"].as_array().unwrap().len(), expected);
        }

        let (status, summary) = send(&app, "GET", "/api/summary?month=2&year=2024", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["creditExpenses"], 300.0);
        assert_eq!(summary["balance"], 1700.0);
    }

    #[tokio::test]
    async fn test_goal_funding_flow() {
        let (app, _) = setup_test().await;
        send(&app, "PUT", "/api/salary", Some(json!({ "salary": 150 }))).await;

        let goal = |name: &str| {
            json!({
                "name": name,
                "totalTarget": 1000,
                "contributionType": "fixed",
                "contributionValue": 100
            })
        };
        let (status, g1) = send(&app, "POST", "/api/goals", Some(goal("G1"))).await;
        assert_eq!(status, StatusCode::CREATED);
        send(&app, "POST", "/api/goals", Some(goal("G2"))).await;

        let (status, processed) =
            send(&app, "POST", "/api/contributions/process?month=5&year=2024", None).await;
        assert_eq!(status, StatusCode::OK);
        let created = processed["created"].as_array().unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0]["amount"], 100.0);
        assert_eq!(created[0]["isComplete"], true);
        assert_eq!(created[1]["amount"], 50.0);
        assert_eq!(created[1]["isComplete"], false);

        let (_, again) =
            send(&app, "POST", "/api/contributions/process?month=5&year=2024", None).await;
        assert!(again["created"].as_array().unwrap().is_empty());

        let (_, goals) = send(&app, "GET", "/api/goals", None).await;
        assert_eq!(goals["goals"][0]["currentAmount"], 100.0);
        assert_eq!(goals["goals"][0]["progressPercent"], 10.0);
        assert_eq!(goals["goals"][1]["remainingTarget"], 950.0);

        let id = g1["id"].as_str().unwrap();
        let (status, deleted) = send(&app, "DELETE", &format!("/api/goals/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["removedContributions"], 1);

        let (_, listed) = send(&app, "GET", "/api/contributions?month=5&year=2024", None).await;
        assert_eq!(listed["contributions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (app, _) = setup_test().await;

        let (status, body) = send(&app, "PUT", "/api/salary", Some(json!({ "salary": -10 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Salary"));

        let (status, _) = send(&app, "DELETE", "/api/transactions/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "POST", "/api/goals/missing/toggle", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/api/summary?month=13&year=2024", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "PUT", "/api/settings", Some(json!({ "goalContributionDay": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_and_import() {
        let (app, state) = setup_test().await;
        send(&app, "PUT", "/api/salary", Some(json!({ "salary": 1200 }))).await;

        let (status, document) = send(&app, "GET", "/api/export?month=1&year=2024", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(document["salary"], 1200.0);
        assert_eq!(document["resumo"]["mesReferencia"], 1);

        let (status, _) = send(
            &app,
            "POST",
            "/api/import",
            Some(json!({ "document": { "salary": 900 } })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(state.store.lock().await.salary(), 1200.0);

        let (status, _) = send(
            &app,
            "POST",
            "/api/import",
            Some(json!({ "document": {}, "confirmOverwrite": true })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, imported) = send(
            &app,
            "POST",
            "/api/import",
            Some(json!({ "document": { "salary": 900 }, "confirmOverwrite": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(imported["transactionCount"], 0);
        assert_eq!(state.store.lock().await.salary(), 900.0);
    }

    #[tokio::test]
    async fn test_malformed_import_body() {
        let (app, _) = setup_test().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/import")
            .body(Body::from("{ definitely not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
