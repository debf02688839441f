//! Alert Bridge: relays alert webhooks into signed Bitunix futures orders
//!
//! This is the root crate that provides benchmark and integration-test
//! access to the workspace crates:
//!
//! - `bridge-core`: Trade instructions, signing, the order gateway, config
//! - `webhook-server`: HTTP front door and the `webhook-server` binary

pub use bridge_core as core;
pub use webhook_server as server;
