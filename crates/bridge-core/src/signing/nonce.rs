//! Fresh nonce and timestamp generation.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Supplies the per-request replay-protection values.
///
/// Implementations must return a new nonce on every call and read the
/// clock at call time.
#[cfg_attr(test, mockall::automock)]
pub trait NonceSource: Send + Sync {
    /// A single-use random token.
    fn fresh_nonce(&self) -> String;

    /// Current epoch time in milliseconds.
    fn timestamp_millis(&self) -> i64;
}

/// Thread RNG nonces and wall-clock timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNonceSource;

impl SystemNonceSource {
    /// Nonce length required by the exchange.
    pub const NONCE_LEN: usize = 32;
}

impl NonceSource for SystemNonceSource {
    fn fresh_nonce(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LEN)
            .map(char::from)
            .collect()
    }

    fn timestamp_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nonce_format() {
        let nonce = SystemNonceSource.fresh_nonce();
        assert_eq!(nonce.len(), SystemNonceSource::NONCE_LEN);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_nonces_are_not_reused() {
        let nonces: HashSet<String> = (0..1000).map(|_| SystemNonceSource.fresh_nonce()).collect();
        assert_eq!(nonces.len(), 1000);
    }

    #[test]
    fn test_timestamp_is_current_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let ts = SystemNonceSource.timestamp_millis();
        let after = chrono::Utc::now().timestamp_millis();

        assert!(ts >= before && ts <= after);
        // Millisecond resolution: 13 digits until the year 2286.
        assert_eq!(ts.to_string().len(), 13);
    }
}
