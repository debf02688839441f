//! Application state shared across handlers.

use bridge_core::config::WebhookConfig;
use bridge_core::{OrderRouter, RecentAlerts};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Order router the webhook dispatches to.
    pub router: Arc<dyn OrderRouter>,
    /// Shared secret every webhook payload must carry.
    security_token: String,
    /// Ids of recently processed alerts.
    pub recent_alerts: RecentAlerts,
}

impl AppState {
    pub fn new(router: Arc<dyn OrderRouter>, webhook: &WebhookConfig) -> Self {
        Self {
            router,
            security_token: webhook.security_token.clone(),
            recent_alerts: RecentAlerts::new(webhook.dedup_capacity),
        }
    }

    /// Compare a presented token with the configured one without
    /// short-circuiting on the first differing byte.
    pub fn token_matches(&self, presented: &str) -> bool {
        constant_time_eq(presented.as_bytes(), self.security_token.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"tokem"));
        assert!(!constant_time_eq(b"token", b"token-longer"));
        assert!(!constant_time_eq(b"", b"token"));
    }
}
