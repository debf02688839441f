//! Webhook server binary entrypoint.

use bridge_core::config::Config;
use bridge_core::OrderGateway;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webhook_server::{ApiServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env()?;
    let gateway = OrderGateway::new(&config.exchange)?;

    tracing::info!(
        order_url = %config.exchange.order_url(),
        scheme = %config.exchange.scheme,
        timeout_ms = config.exchange.timeout.as_millis() as u64,
        dedup_capacity = config.webhook.dedup_capacity,
        "Exchange gateway configured"
    );

    let server = ApiServer::new(ServerConfig::from_env(), Arc::new(gateway), &config.webhook);
    server.run().await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "webhook_server=info,bridge_core=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
