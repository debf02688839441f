//! Signature computation.

use super::scheme::{HashConstruction, MessageField, SignatureScheme};
use crate::{Error, Result};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// API credentials for authenticated exchange requests.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Create credentials, rejecting empty values.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let secret_key = secret_key.into();

        if api_key.is_empty() {
            return Err(Error::Config {
                message: "API key is empty".to_string(),
            });
        }
        if secret_key.is_empty() {
            return Err(Error::Config {
                message: "secret key is empty".to_string(),
            });
        }

        Ok(Self {
            api_key,
            secret_key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

/// An outbound request with its authentication material.
///
/// Built once per call and never reused: the nonce and timestamp are only
/// valid for a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: &'static str,
    pub path: String,
    /// Exact bytes sent as the request body; also the bytes that were signed.
    pub canonical_body: String,
    /// Epoch milliseconds at signing time.
    pub timestamp: String,
    pub nonce: String,
    /// Lowercase hex digest.
    pub signature: String,
}

/// Stateless signer for a fixed scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signer {
    scheme: SignatureScheme,
}

impl Signer {
    pub fn new(scheme: SignatureScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    /// Concatenate the message components in the scheme's order.
    pub fn message(&self, api_key: &str, canonical_body: &str, timestamp: &str, nonce: &str) -> String {
        let mut message = String::with_capacity(
            api_key.len() + canonical_body.len() + timestamp.len() + nonce.len(),
        );
        for field in self.scheme.field_order() {
            message.push_str(match field {
                MessageField::Nonce => nonce,
                MessageField::Timestamp => timestamp,
                MessageField::ApiKey => api_key,
                MessageField::Body => canonical_body,
            });
        }
        message
    }

    /// Compute the hex signature for one request.
    ///
    /// Pure: the same inputs always produce the same output. The only
    /// failure is an empty secret, which is a configuration error.
    pub fn sign(
        &self,
        api_key: &str,
        secret_key: &str,
        canonical_body: &str,
        timestamp: &str,
        nonce: &str,
    ) -> Result<String> {
        if secret_key.is_empty() {
            return Err(Error::Config {
                message: "secret key is empty".to_string(),
            });
        }

        let message = self.message(api_key, canonical_body, timestamp, nonce);

        match self.scheme.construction() {
            HashConstruction::DoubleSha256 => {
                let digest = hex::encode(Sha256::digest(message.as_bytes()));
                let outer = format!("{digest}{secret_key}");
                Ok(hex::encode(Sha256::digest(outer.as_bytes())))
            }
            HashConstruction::HmacSha256 => {
                let mut mac =
                    <HmacSha256 as KeyInit>::new_from_slice(secret_key.as_bytes()).map_err(|e| Error::Signing {
                        message: format!("Failed to create HMAC: {}", e),
                    })?;
                mac.update(message.as_bytes());
                Ok(hex::encode(mac.finalize().into_bytes()))
            }
        }
    }

    /// Sign with stored credentials.
    pub fn sign_with(
        &self,
        credentials: &Credentials,
        canonical_body: &str,
        timestamp: &str,
        nonce: &str,
    ) -> Result<String> {
        self.sign(
            credentials.api_key(),
            credentials.secret_key(),
            canonical_body,
            timestamp,
            nonce,
        )
    }
}
