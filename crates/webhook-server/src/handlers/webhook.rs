//! Alert webhook handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use bridge_core::types::{OrderType, Side, TradeInstruction, TradeSide};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{gateway_response, ApiError, ApiResult, ErrorResponse};
use crate::state::AppState;

/// Alert posted by the charting platform.
#[derive(Deserialize, ToSchema)]
pub struct AlertPayload {
    /// Shared secret; must match `SECURITY_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
    /// Instrument, e.g. `LINKUSDT` or `BINANCE:LINKUSDT.P`.
    #[serde(default)]
    pub symbol: Option<String>,
    /// `buy` or `sell`, any case.
    #[serde(default)]
    pub side: Option<String>,
    /// Decimal quantity, as a JSON string or number.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub quantity: Option<Value>,
    /// `open` (default) or `close`.
    #[serde(default, rename = "tradeSide", alias = "trade_side")]
    pub trade_side: Option<String>,
    /// `market` (default) or `limit`.
    #[serde(default, rename = "orderType", alias = "order_type")]
    pub order_type: Option<String>,
    #[serde(default, rename = "reduceOnly", alias = "reduce_only")]
    pub reduce_only: Option<bool>,
    /// Identity used for duplicate suppression.
    #[serde(default)]
    pub alert_id: Option<String>,
}

/// Webhook response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookResponse {
    /// `success` or `ignored`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Exchange response on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl WebhookResponse {
    fn success(details: Value) -> Self {
        Self {
            status: "success".to_string(),
            reason: None,
            details: Some(details),
        }
    }

    fn duplicate() -> Self {
        Self {
            status: "ignored".to_string(),
            reason: Some("duplicate".to_string()),
            details: None,
        }
    }
}

/// A validated alert ready for dispatch.
#[derive(Debug)]
struct Alert {
    id: String,
    instruction: TradeInstruction,
}

impl AlertPayload {
    fn into_alert(self) -> ApiResult<Alert> {
        let symbol = required("symbol", self.symbol)?;
        let side: Side = required("side", self.side)?.parse()?;
        let quantity = quantity_text(self.quantity)?;

        let mut instruction = TradeInstruction::new(symbol.trim(), side, quantity);
        if let Some(trade_side) = non_empty(self.trade_side) {
            instruction = instruction.with_trade_side(trade_side.parse::<TradeSide>()?);
        }
        if let Some(order_type) = non_empty(self.order_type) {
            instruction = instruction.with_order_type(order_type.parse::<OrderType>()?);
        }
        instruction = instruction.with_reduce_only(self.reduce_only.unwrap_or(false));

        // Identity comes from the normalized order so equivalent alerts collide.
        let instruction = instruction.normalized().map_err(|e| match e {
            bridge_core::Error::Validation { message } => ApiError::Validation(message),
            other => other.into(),
        })?;

        let id = non_empty(self.alert_id).unwrap_or_else(|| {
            format!(
                "{}-{}-{}",
                instruction.symbol, instruction.side, instruction.quantity
            )
        });

        Ok(Alert { id, instruction })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(field: &str, value: Option<String>) -> ApiResult<String> {
    non_empty(value).ok_or_else(|| ApiError::BadRequest(format!("missing {field}")))
}

fn quantity_text(value: Option<Value>) -> ApiResult<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(ApiError::BadRequest("missing quantity".to_string()))
        }
        Some(other) => Err(ApiError::BadRequest(format!(
            "quantity must be a string or number, got {other}"
        ))),
    }
}

/// Receive an alert and relay it to the exchange.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "webhook",
    request_body = AlertPayload,
    responses(
        (status = 200, description = "Order placed or duplicate ignored", body = WebhookResponse),
        (status = 400, description = "Malformed alert", body = ErrorResponse),
        (status = 403, description = "Invalid security token", body = ErrorResponse),
        (status = 422, description = "Alert failed order validation", body = ErrorResponse),
        (status = 502, description = "Exchange rejected or unreachable", body = ErrorResponse),
        (status = 504, description = "Exchange timed out", body = ErrorResponse)
    )
)]
pub async fn receive_alert(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<WebhookResponse>> {
    let Json(body) = body?;

    // Authenticate before the payload shape is inspected.
    let token_ok = body
        .get("token")
        .and_then(Value::as_str)
        .is_some_and(|token| state.token_matches(token));
    if !token_ok {
        warn!("Rejected alert with invalid security token");
        return Err(ApiError::Forbidden("invalid security token".to_string()));
    }

    let payload: AlertPayload = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("malformed alert: {e}")))?;
    let alert = payload.into_alert()?;

    if !state.recent_alerts.check_and_record(&alert.id) {
        warn!(alert_id = %alert.id, "Duplicate alert ignored");
        return Ok(Json(WebhookResponse::duplicate()));
    }

    info!(
        alert_id = %alert.id,
        symbol = %alert.instruction.symbol,
        side = %alert.instruction.side,
        "Alert accepted"
    );

    let response = gateway_response(state.router.place_order(&alert.instruction).await)?;
    Ok(Json(WebhookResponse::success(response)))
}
