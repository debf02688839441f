//! API error types and handling.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_core::GatewayResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid JSON: {0}")]
    JsonRejection(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Exchange rejected credentials (HTTP {0})")]
    ExchangeAuth(u16),

    #[error("Exchange rejected order: {reason}")]
    ExchangeRejected {
        status: Option<u16>,
        code: Option<i64>,
        reason: String,
    },

    #[error("Exchange unreachable: {0}")]
    ExchangeUnreachable(String),

    #[error("Exchange did not respond in time")]
    ExchangeTimeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ExchangeAuth(_) => StatusCode::BAD_GATEWAY,
            ApiError::ExchangeRejected { .. } => StatusCode::BAD_GATEWAY,
            ApiError::ExchangeUnreachable(_) => StatusCode::BAD_GATEWAY,
            ApiError::ExchangeTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::JsonRejection(_) => "INVALID_JSON",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::ExchangeAuth(_) => "EXCHANGE_AUTH_FAILED",
            ApiError::ExchangeRejected { .. } => "EXCHANGE_REJECTED",
            ApiError::ExchangeUnreachable(_) => "EXCHANGE_UNREACHABLE",
            ApiError::ExchangeTimeout => "EXCHANGE_TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::ExchangeAuth(status) => Some(serde_json::json!({ "http_status": status })),
            ApiError::ExchangeRejected { status, code, .. } => {
                Some(serde_json::json!({ "http_status": status, "exchange_code": code }))
            }
            _ => None,
        }
    }
}

/// Turn a gateway outcome into the exchange response or the matching
/// API error.
pub fn gateway_response(result: GatewayResult) -> ApiResult<serde_json::Value> {
    match result {
        GatewayResult::Success { response } => Ok(response),
        GatewayResult::AuthError { http_status } => Err(ApiError::ExchangeAuth(http_status)),
        GatewayResult::ClientError {
            status,
            code,
            reason,
        } => Err(ApiError::ExchangeRejected {
            status,
            code,
            reason,
        }),
        GatewayResult::Timeout => Err(ApiError::ExchangeTimeout),
        GatewayResult::TransportError { detail } => Err(ApiError::ExchangeUnreachable(detail)),
        GatewayResult::ValidationError { reason } => Err(ApiError::Validation(reason)),
        GatewayResult::ConfigurationError { reason } => Err(ApiError::Internal(reason)),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection, "JSON parsing failed");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::JsonRejection(rejection.body_text())
    }
}

impl From<bridge_core::Error> for ApiError {
    fn from(err: bridge_core::Error) -> Self {
        match err {
            bridge_core::Error::Validation { message } => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(
                error_code = self.error_code(),
                error = %self,
                "Internal server error"
            );
        }

        let mut body = ErrorResponse::new(self.error_code(), self.to_string());
        if let Some(details) = self.details() {
            body = body.with_details(details);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_result_mapping() {
        let cases = [
            (GatewayResult::AuthError { http_status: 401 }, StatusCode::BAD_GATEWAY, "EXCHANGE_AUTH_FAILED"),
            (
                GatewayResult::ClientError {
                    status: Some(200),
                    code: Some(10007),
                    reason: "Signature Error".to_string(),
                },
                StatusCode::BAD_GATEWAY,
                "EXCHANGE_REJECTED",
            ),
            (
                GatewayResult::TransportError { detail: "refused".to_string() },
                StatusCode::BAD_GATEWAY,
                "EXCHANGE_UNREACHABLE",
            ),
            (GatewayResult::Timeout, StatusCode::GATEWAY_TIMEOUT, "EXCHANGE_TIMEOUT"),
            (
                GatewayResult::ValidationError { reason: "quantity must be positive".to_string() },
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (
                GatewayResult::ConfigurationError { reason: "secret key is empty".to_string() },
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (result, status, code) in cases {
            let err = gateway_response(result).unwrap_err();
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn test_success_passes_response_through() {
        let success = GatewayResult::Success {
            response: serde_json::json!({"code": 0}),
        };
        assert_eq!(gateway_response(success).unwrap(), serde_json::json!({"code": 0}));
    }

    #[test]
    fn test_rejection_details() {
        let err = ApiError::ExchangeRejected {
            status: Some(200),
            code: Some(20003),
            reason: "Insufficient balance".to_string(),
        };
        let details = err.details().unwrap();
        assert_eq!(details["exchange_code"], 20003);
        assert_eq!(details["http_status"], 200);
    }

    #[test]
    fn test_core_validation_is_bad_request() {
        let err: ApiError = bridge_core::Error::Validation {
            message: "invalid side".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
