//! Exchange order-entry API.

pub mod gateway;
pub mod result;

pub use gateway::{OrderGateway, OrderRequest, OrderRouter};
pub use result::{classify_response, classify_transport_error, GatewayResult, SUCCESS_CODE};
