use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use api::coinbase::CoinbaseClient;
use config::AppConfig;
use services::RefreshDriver;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("coinboard=debug".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📊 Starting coinboard...");

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    info!("Tracking {} every {}ms", config.coins.join(", "), config.refresh_interval.as_millis());
    if let Some(path) = &config.output {
        info!("Publishing charts to {}", path.display());
    }

    let client = CoinbaseClient::new(config.base_url.clone());
    info!("Fetching prices from {}", client.base_url());
    let driver = Arc::new(RefreshDriver::new(client, &config));
    let handle = driver.start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down...");
    handle.shutdown().await;
}
