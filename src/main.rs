//! Storefront Backend - catalog, cart, orders and payments over HTTP

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::config::AppConfig;
use storefront_backend::middleware::TrustedProxyVerifier;
use storefront_backend::payment::{RazorpayGateway, SignatureVerifier};
use storefront_backend::publisher::EventPublisher;
use storefront_backend::storage::{PgStore, Stores};
use storefront_backend::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = PgStore::connect(&config.database_url, config.database_max_connections).await?;
    store.migrate().await?;

    let publisher = match config.nats_url.as_deref() {
        Some(url) => EventPublisher::connect(url).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "NATS unavailable, events will not be published");
            EventPublisher::disabled()
        }),
        None => EventPublisher::disabled(),
    };

    if config.products_owner.is_none() {
        tracing::warn!("PRODUCTS_OWNER_ID is not set; product creation is disabled");
    }

    let state = AppState::new(
        Stores::postgres(store),
        Arc::new(RazorpayGateway::new(&config.razorpay)),
        SignatureVerifier::new(config.razorpay.key_secret.clone()),
        Arc::new(TrustedProxyVerifier),
        publisher,
        config.products_owner,
    );

    let addr = config.socket_addr();
    tracing::info!("Storefront backend listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;
    Ok(())
}
