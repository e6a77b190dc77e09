pub mod categories;
pub mod payments;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::payments::{routes as payments_routes, PaymentService};

async fn root() -> Json<Value> {
    Json(json!({ "message": "API is running!" }))
}

async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

/// All API routes, each feature backed by its own service over `pool`
pub fn routes(pool: SqlitePool) -> Router {
    let category_service = Arc::new(CategoryService::new(pool.clone()));
    tracing::info!("Category service initialized");

    let payment_service = Arc::new(PaymentService::new(pool));
    tracing::info!("Payment service initialized");

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(categories_routes::routes(category_service))
        .merge(payments_routes::routes(payment_service))
}
