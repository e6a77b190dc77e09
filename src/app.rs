use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use sqlx::SqlitePool;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{Config, SwaggerConfig};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features;

/// Swagger UI plus the OpenAPI document, behind basic auth when credentials are configured
fn swagger_routes(config: &SwaggerConfig) -> Router {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
    }
    .modify(&mut openapi);

    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    match config.credentials() {
        Some(credentials) => {
            tracing::info!("Swagger UI basic auth enabled");
            swagger.layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
        }
        None => {
            tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
            swagger
        }
    }
}

/// Full application: API routes, docs and the HTTP middleware stack
pub fn build_router(config: &Config, pool: SqlitePool) -> Router {
    Router::new()
        .merge(swagger_routes(&config.swagger))
        .merge(features::routes(pool))
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Echo X-Request-Id back on the response
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // UUID v7 unless the client sent its own id
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AppConfig, DatabaseConfig};
    use crate::shared::test_helpers::create_test_pool;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn test_config(swagger_username: Option<&str>, max_request_body_size: usize) -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_allowed_origins: vec!["*".to_string()],
                max_request_body_size,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 600,
                max_lifetime_secs: 1800,
            },
            swagger: SwaggerConfig {
                username: swagger_username.map(str::to_string),
                password: swagger_username.map(|_| "secret".to_string()),
                title: "Expenses".to_string(),
                version: "9.9.9".to_string(),
                description: "Test docs".to_string(),
            },
        }
    }

    async fn server(config: &Config) -> TestServer {
        TestServer::new(build_router(config, create_test_pool().await)).unwrap()
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let server = server(&test_config(None, 1024 * 1024)).await;

        let response = server.get("/health").await;

        response.assert_status_ok();
        assert!(response.headers().get("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_propagates_client_request_id() {
        let server = server(&test_config(None, 1024 * 1024)).await;

        let response = server
            .get("/health")
            .add_header("x-request-id", HeaderValue::from_static("trace-me"))
            .await;

        assert_eq!(
            response.headers().get("x-request-id"),
            Some(&HeaderValue::from_static("trace-me"))
        );
    }

    #[tokio::test]
    async fn test_openapi_document_uses_configured_info() {
        let server = server(&test_config(None, 1024 * 1024)).await;

        let doc: Value = server.get("/api-docs/openapi.json").await.json();

        assert_eq!(doc["info"]["title"], "Expenses");
        assert_eq!(doc["info"]["version"], "9.9.9");
    }

    #[tokio::test]
    async fn test_docs_require_basic_auth_when_configured() {
        let server = server(&test_config(Some("admin"), 1024 * 1024)).await;

        server
            .get("/api-docs/openapi.json")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        // admin:secret
        server
            .get("/api-docs/openapi.json")
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_static("Basic YWRtaW46c2VjcmV0"),
            )
            .await
            .assert_status_ok();

        server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let server = server(&test_config(None, 64)).await;

        let response = server
            .post("/api/categories")
            .json(&json!({ "name": "x".repeat(256) }))
            .await;

        assert_ne!(response.status_code(), StatusCode::CREATED);
        assert!(response.status_code().is_client_error());
    }
}
