//! API route definitions.

use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::handlers::{health, webhook};
use crate::state::AppState;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alert Bridge API",
        version = "1.0.0",
        description = "Relays authenticated alert webhooks into signed Bitunix futures orders"
    ),
    paths(health::root, health::health_check, webhook::receive_alert),
    components(
        schemas(
            crate::error::ErrorResponse,
            health::StatusResponse,
            health::HealthResponse,
            webhook::AlertPayload,
            webhook::WebhookResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness and health endpoints"),
        (name = "webhook", description = "Alert intake and order relay"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the main router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Alert intake
        .route("/webhook", post(webhook::receive_alert))
        // OpenAPI document
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("Alert Bridge API"));
        assert!(json.contains("/webhook"));
        assert!(json.contains("/health"));
        assert!(json.contains("AlertPayload"));
    }
}
