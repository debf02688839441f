//! Trade instructions derived from inbound alerts.

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Perpetual-contract marker appended to chart symbols (e.g. `LINKUSDT.P`).
const PERPETUAL_SUFFIX: &str = ".P";

/// Direction of the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Whether the order opens or closes a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    #[default]
    Open,
    Close,
}

/// Execution style of the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

macro_rules! wire_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            /// Exchange wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($wire => Ok($ty::$variant),)+
                    other => Err(Error::validation(format!(
                        "invalid {}: {:?}", $field, other
                    ))),
                }
            }
        }
    };
}

wire_enum!(Side, "side", { Buy => "BUY", Sell => "SELL" });
wire_enum!(TradeSide, "tradeSide", { Open => "OPEN", Close => "CLOSE" });
wire_enum!(OrderType, "orderType", { Market => "MARKET", Limit => "LIMIT" });

/// A single order request, built once per inbound alert.
///
/// Fields are kept as received; [`TradeInstruction::normalized`] produces
/// the exchange-ready form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeInstruction {
    pub symbol: String,
    pub side: Side,
    pub trade_side: TradeSide,
    pub order_type: OrderType,
    /// Decimal quantity as a string, to avoid float rounding.
    pub quantity: String,
    pub reduce_only: bool,
}

impl TradeInstruction {
    /// Create an opening market order.
    pub fn new(symbol: impl Into<String>, side: Side, quantity: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            trade_side: TradeSide::default(),
            order_type: OrderType::default(),
            quantity: quantity.into(),
            reduce_only: false,
        }
    }

    pub fn with_trade_side(mut self, trade_side: TradeSide) -> Self {
        self.trade_side = trade_side;
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    /// Validate and coerce into the exchange's expected format.
    ///
    /// Fails with [`Error::Validation`] for an empty or malformed symbol and
    /// for a quantity that is not a positive decimal.
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            symbol: normalize_symbol(&self.symbol)?,
            quantity: normalize_quantity(&self.quantity)?,
            ..self.clone()
        })
    }
}

/// Uppercase the symbol and strip chart-specific decorations.
///
/// `BINANCE:linkusdt.p` becomes `LINKUSDT`.
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let without_prefix = raw.trim().rsplit(':').next().unwrap_or_default();
    let upper = without_prefix.trim().to_ascii_uppercase();
    let symbol = upper.strip_suffix(PERPETUAL_SUFFIX).unwrap_or(upper.as_str());

    if symbol.is_empty() {
        return Err(Error::validation("symbol is empty"));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation(format!(
            "symbol contains unsupported characters: {symbol:?}"
        )));
    }
    Ok(symbol.to_string())
}

/// Parse a positive decimal quantity and render it without trailing zeros.
pub fn normalize_quantity(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("quantity is empty"));
    }

    let qty = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| Error::validation(format!("quantity is not a decimal: {trimmed:?}")))?;

    if qty <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "quantity must be greater than zero, got {trimmed}"
        )));
    }
    Ok(qty.normalize().to_string())
}
