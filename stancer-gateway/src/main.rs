use anyhow::Context;
use reqwest::Client;
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stancer_gateway::{
    router, AppState, GatewayConfig, GatewayMetrics, HostPlatform, HttpHost, InMemoryHost,
    StancerClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env()?;
    if !config.credentials().is_complete() {
        warn!(mode = ?config.mode(), "API keys are not present in the configuration; pay links will show a warning");
    }

    let provider = StancerClient::new(config.api_base_url.clone(), config.http_timeout)
        .context("failed to build provider HTTP client")?;

    let host: Arc<dyn HostPlatform> = match &config.host_api_url {
        Some(url) => {
            info!(host_api_url = %url, "Forwarding host calls over HTTP");
            let client = Client::builder()
                .timeout(config.http_timeout)
                .build()
                .context("failed to build host HTTP client")?;
            Arc::new(HttpHost::new(client, url.clone()))
        }
        None => {
            warn!("HOST_API_URL not set; using in-memory host (every invoice id is accepted)");
            Arc::new(InMemoryHost::permissive())
        }
    };

    let metrics = GatewayMetrics::new()?;
    info!(
        mode = ?config.mode(),
        api_base_url = %config.api_base_url,
        system_url = %config.system_url,
        "Stancer gateway configured"
    );
    let app = router(AppState::new(config, provider, host, metrics));

    let bind_host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8090);
    let ip: std::net::IpAddr = bind_host.parse()?;
    let addr = SocketAddr::from((ip, port));
    info!(%addr, "starting stancer-gateway");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
