use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::payments::handlers;
use crate::features::payments::services::PaymentService;

/// Create routes for the payments feature
pub fn routes(service: Arc<PaymentService>) -> Router {
    Router::new()
        .route(
            "/api/payments",
            get(handlers::list_payments).post(handlers::create_payment),
        )
        .route(
            "/api/payments/{id}",
            get(handlers::get_payment)
                .put(handlers::update_payment)
                .delete(handlers::delete_payment),
        )
        .route("/api/search/payments", get(handlers::search_payments))
        .route(
            "/api/search/payments-by-category",
            get(handlers::search_payments_by_category),
        )
        .with_state(service)
}
