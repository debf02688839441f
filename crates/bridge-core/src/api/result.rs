//! Classified outcome of a single order call.

use serde_json::Value;

/// Business status code the exchange uses for success.
pub const SUCCESS_CODE: i64 = 0;

/// Longest slice of a raw exchange body kept in a failure reason.
const MAX_REASON_LEN: usize = 512;

/// Result of one `place_order` call. Every failure is data, never a panic
/// or an `Err`, so the caller can map it to its own response surface.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult {
    /// Exchange accepted the order; carries the full response body.
    Success { response: Value },
    /// HTTP 401/403: credentials or signature rejected.
    AuthError { http_status: u16 },
    /// Rejected at the HTTP level (`code` is `None`) or by business code.
    ClientError {
        status: Option<u16>,
        code: Option<i64>,
        reason: String,
    },
    /// No response within the configured timeout.
    Timeout,
    /// Connection, DNS or TLS failure.
    TransportError { detail: String },
    /// Instruction rejected before any network call.
    ValidationError { reason: String },
    /// Signing refused because of missing credentials.
    ConfigurationError { reason: String },
}

impl GatewayResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GatewayResult::Success { .. })
    }

    /// Short name for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            GatewayResult::Success { .. } => "success",
            GatewayResult::AuthError { .. } => "auth_error",
            GatewayResult::ClientError { .. } => "client_error",
            GatewayResult::Timeout => "timeout",
            GatewayResult::TransportError { .. } => "transport_error",
            GatewayResult::ValidationError { .. } => "validation_error",
            GatewayResult::ConfigurationError { .. } => "configuration_error",
        }
    }
}

/// Classify an HTTP response that arrived in full.
///
/// A 2xx status is not enough: the embedded `code` must also be
/// [`SUCCESS_CODE`].
pub fn classify_response(status: u16, body: &str) -> GatewayResult {
    if status == 401 || status == 403 {
        return GatewayResult::AuthError { http_status: status };
    }

    if !(200..300).contains(&status) {
        return GatewayResult::ClientError {
            status: Some(status),
            code: None,
            reason: truncate(body),
        };
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            return GatewayResult::ClientError {
                status: Some(status),
                code: None,
                reason: format!("unparseable exchange response: {}", truncate(body)),
            }
        }
    };

    let code = value.get("code").and_then(|code| match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });

    match code {
        Some(SUCCESS_CODE) => GatewayResult::Success { response: value },
        Some(code) => GatewayResult::ClientError {
            status: Some(status),
            code: Some(code),
            reason: value
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("exchange rejected the order")
                .to_string(),
        },
        None => GatewayResult::ClientError {
            status: Some(status),
            code: None,
            reason: format!("exchange response has no status code: {}", truncate(body)),
        },
    }
}

/// Classify a failure raised by the HTTP client itself.
pub fn classify_transport_error(err: &reqwest::Error) -> GatewayResult {
    if err.is_timeout() {
        GatewayResult::Timeout
    } else {
        GatewayResult::TransportError {
            detail: err.to_string(),
        }
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_REASON_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
