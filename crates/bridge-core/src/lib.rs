//! Bridge Core Library
//!
//! Trade instructions, request signing and the authenticated order gateway
//! that relays alert signals to the Bitunix futures API.

pub mod api;
pub mod config;
pub mod dedup;
pub mod error;
pub mod signing;
pub mod types;

pub use api::{GatewayResult, OrderGateway, OrderRouter};
pub use dedup::RecentAlerts;
pub use error::{Error, Result};
