//! `txrelay` binary: loads configuration and serves the ingestion endpoint.

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use txrelay::{Gateway, GatewayConfig, http};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = cli::Cli::parse();
    let mut config = GatewayConfig::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    #[cfg(feature = "metrics")]
    if let Some(addr) = config.server.metrics_bind {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        tracing::info!(%addr, "serving metrics");
    }

    let gateway = Arc::new(Gateway::from_config(&config)?);
    tracing::info!(backends = gateway.dispatcher().len(), "gateway ready");

    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening for segments");
    axum::serve(listener, http::router(gateway))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
