//! Request signing for the Bitunix futures API.
//!
//! Every authenticated call carries a signature computed from the exact
//! body bytes that go on the wire, a fresh nonce and the current epoch
//! millisecond timestamp.
//!
//! # Architecture
//!
//! ```text
//! NonceSource ── nonce, timestamp ──┐
//!                                   ▼
//! canonical body ──────────────► Signer ──► SignedRequest
//!                                   ▲              │
//! Credentials + SignatureScheme ────┘              ▼
//!                                            OrderGateway
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bridge_core::signing::{SignatureScheme, Signer};
//!
//! let signer = Signer::new(SignatureScheme::DoubleSha256V1);
//! let sign = signer.sign("api-key", "secret", r#"{"symbol":"BTCUSDT"}"#, "1700000000000", "nonce")?;
//! ```

pub mod nonce;
pub mod scheme;
pub mod signer;

pub use nonce::{NonceSource, SystemNonceSource};
pub use scheme::{HashConstruction, MessageField, SignatureScheme};
pub use signer::{Credentials, SignedRequest, Signer};

#[cfg(test)]
pub use nonce::MockNonceSource;
