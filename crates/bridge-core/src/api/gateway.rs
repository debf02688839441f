//! Authenticated order gateway for the Bitunix futures API.
//!
//! Turns one [`TradeInstruction`] into exactly one signed POST and a
//! classified [`GatewayResult`]. There is no retry here: a signed envelope
//! is bound to its nonce and timestamp, so any retry must go back through
//! [`OrderGateway::place_order`] to be signed afresh.

use super::result::{classify_response, classify_transport_error, GatewayResult};
use crate::config::ExchangeConfig;
use crate::signing::{Credentials, NonceSource, SignedRequest, Signer, SystemNonceSource};
use crate::types::{OrderType, Side, TradeInstruction, TradeSide};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Places orders for trade instructions.
#[async_trait]
pub trait OrderRouter: Send + Sync {
    async fn place_order(&self, instruction: &TradeInstruction) -> GatewayResult;
}

/// Request body for placing an order.
///
/// Field order here is the wire order; it must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub trade_side: TradeSide,
    pub order_type: OrderType,
    pub qty: String,
    pub reduce_only: bool,
}

impl OrderRequest {
    /// Normalize an instruction into the request body.
    pub fn from_instruction(instruction: &TradeInstruction) -> Result<Self> {
        let normalized = instruction.normalized()?;
        Ok(Self {
            symbol: normalized.symbol,
            side: normalized.side,
            trade_side: normalized.trade_side,
            order_type: normalized.order_type,
            qty: normalized.quantity,
            reduce_only: normalized.reduce_only,
        })
    }

    /// Minified JSON: the bytes that are both signed and transmitted.
    pub fn canonical_body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Authenticated client for the order-entry endpoint.
pub struct OrderGateway {
    http_client: reqwest::Client,
    base_url: String,
    order_path: String,
    credentials: Credentials,
    signer: Signer,
    nonce_source: Arc<dyn NonceSource>,
    timeout: Duration,
}

impl OrderGateway {
    pub const API_KEY_HEADER: &'static str = "api-key";
    pub const SIGN_HEADER: &'static str = "sign";
    pub const NONCE_HEADER: &'static str = "nonce";
    pub const TIMESTAMP_HEADER: &'static str = "timestamp";

    /// Build a gateway with one pooled HTTP client bounded by the
    /// configured timeout.
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            order_path: config.order_path.clone(),
            credentials: config.credentials.clone(),
            signer: Signer::new(config.scheme),
            nonce_source: Arc::new(SystemNonceSource),
            timeout: config.timeout,
        })
    }

    /// Replace the nonce and timestamp source.
    pub fn with_nonce_source(mut self, nonce_source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = nonce_source;
        self
    }

    /// Normalize, encode and sign an instruction without sending it.
    pub fn prepare(&self, instruction: &TradeInstruction) -> Result<SignedRequest> {
        self.sign_request(&OrderRequest::from_instruction(instruction)?)
    }

    /// Encode and sign an already normalized request.
    pub fn sign_request(&self, request: &OrderRequest) -> Result<SignedRequest> {
        let canonical_body = request.canonical_body()?;

        let nonce = self.nonce_source.fresh_nonce();
        let timestamp = self.nonce_source.timestamp_millis().to_string();
        let signature = self
            .signer
            .sign_with(&self.credentials, &canonical_body, &timestamp, &nonce)?;

        Ok(SignedRequest {
            method: "POST",
            path: self.order_path.clone(),
            canonical_body,
            timestamp,
            nonce,
            signature,
        })
    }

    /// Place one order. Exactly one outbound call unless the instruction is
    /// rejected during preparation, in which case none is made.
    pub async fn place_order(&self, instruction: &TradeInstruction) -> GatewayResult {
        let started = Instant::now();

        let request = match OrderRequest::from_instruction(instruction) {
            Ok(request) => request,
            Err(Error::Validation { message }) => {
                warn!(symbol = %instruction.symbol, reason = %message, "Order rejected before dispatch");
                return GatewayResult::ValidationError { reason: message };
            }
            Err(e) => return Self::unsigned(e),
        };

        let signed = match self.sign_request(&request) {
            Ok(signed) => signed,
            Err(e) => return Self::unsigned(e),
        };

        info!(
            symbol = %request.symbol,
            side = %request.side,
            trade_side = %request.trade_side,
            order_type = %request.order_type,
            qty = %request.qty,
            reduce_only = request.reduce_only,
            scheme = %self.signer.scheme(),
            "Dispatching order"
        );

        let result = self.send(signed).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match &result {
            GatewayResult::Success { .. } => {
                info!(latency_ms, "Order accepted by exchange");
            }
            GatewayResult::ClientError { status, code, reason } => {
                warn!(latency_ms, ?status, ?code, reason = %reason, "Order rejected by exchange");
            }
            other => {
                warn!(latency_ms, outcome = other.label(), "Order not accepted");
            }
        }

        result
    }

    fn unsigned(err: Error) -> GatewayResult {
        warn!(error = %err, "Order could not be signed");
        GatewayResult::ConfigurationError {
            reason: err.to_string(),
        }
    }

    /// Send a signed request. Takes ownership so an envelope cannot be sent
    /// twice.
    pub async fn send(&self, request: SignedRequest) -> GatewayResult {
        let url = format!("{}{}", self.base_url, request.path);

        debug!(payload = %request.canonical_body, "POST order request body");

        let response = self
            .http_client
            .post(&url)
            .header(Self::API_KEY_HEADER, self.credentials.api_key())
            .header(Self::SIGN_HEADER, &request.signature)
            .header(Self::NONCE_HEADER, &request.nonce)
            .header(Self::TIMESTAMP_HEADER, &request.timestamp)
            .header(CONTENT_TYPE, "application/json")
            .body(request.canonical_body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => return classify_transport_error(&e),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => classify_response(status, &body),
            Err(e) => classify_transport_error(&e),
        }
    }
}

#[async_trait]
impl OrderRouter for OrderGateway {
    async fn place_order(&self, instruction: &TradeInstruction) -> GatewayResult {
        OrderGateway::place_order(self, instruction).await
    }
}

impl std::fmt::Debug for OrderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderGateway")
            .field("order_url", &format!("{}{}", self.base_url, self.order_path))
            .field("scheme", &self.signer.scheme())
            .field("timeout", &self.timeout)
            .field("credentials", &self.credentials)
            .finish()
    }
}
