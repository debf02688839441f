//! Webhook Server
//!
//! HTTP front door of the alert bridge: authenticates alert webhooks,
//! suppresses duplicates and relays each alert through an
//! [`OrderRouter`] to the exchange.
//!
//! # Example
//!
//! ```ignore
//! use webhook_server::{ApiServer, ServerConfig};
//!
//! let config = Config::from_env()?;
//! let gateway = Arc::new(OrderGateway::new(&config.exchange)?);
//! let server = ApiServer::new(ServerConfig::from_env(), gateway, &config.webhook);
//! server.run().await?;
//! ```

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::Router;
use bridge_core::config::WebhookConfig;
use bridge_core::OrderRouter;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            // PORT first (hosting platforms set it), then API_PORT
            port: std::env::var("PORT")
                .or_else(|_| std::env::var("API_PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Get the socket address.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// The webhook server.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new server relaying alerts through `router`.
    pub fn new(config: ServerConfig, router: Arc<dyn OrderRouter>, webhook: &WebhookConfig) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(router, webhook)),
        }
    }

    /// Build the routes with tracing and body-limit layers applied.
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
            .layer(
                TraceLayer::new_for_http()
                    .on_request(|request: &Request<_>, _span: &tracing::Span| {
                        tracing::info!(
                            method = %request.method(),
                            uri = %request.uri().path(),
                            "Incoming request"
                        );
                    })
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG))
                    .on_failure(
                        |error: tower_http::classify::ServerErrorsFailureClass,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::error!(
                                error = %error,
                                latency_ms = latency.as_millis(),
                                "Request failed"
                            );
                        },
                    ),
            )
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    }

    /// Run the server.
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();

        let addr = self.config.socket_addr()?;
        info!(address = %addr, "Starting webhook server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::StatusCode;
    use bridge_core::types::TradeInstruction;
    use bridge_core::GatewayResult;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct AcceptAll;

    #[async_trait]
    impl OrderRouter for AcceptAll {
        async fn place_order(&self, _instruction: &TradeInstruction) -> GatewayResult {
            GatewayResult::Success {
                response: serde_json::json!({"code": 0, "msg": "Success"}),
            }
        }
    }

    fn test_server() -> ApiServer {
        let webhook = WebhookConfig {
            security_token: "shared-token-value".to_string(),
            dedup_capacity: 4,
        };
        ApiServer::new(ServerConfig::default(), Arc::new(AcceptAll), &webhook)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_invalid_socket_addr() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            port: 8000,
        };
        assert!(config.socket_addr().is_err());
    }

    #[tokio::test]
    async fn test_root_route() {
        let response = test_server()
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "online");
    }

    #[tokio::test]
    async fn test_openapi_route() {
        let response = test_server()
            .router()
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["paths"].get("/webhook").is_some());
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_json() {
        let response = test_server()
            .router()
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let padding = "x".repeat(MAX_BODY_BYTES + 1);
        let body = format!(r#"{{"token":"shared-token-value","symbol":"{padding}"}}"#);
        let response = test_server()
            .router()
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
