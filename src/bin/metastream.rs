//! MetaStream search server.
//!
//! Loads configuration (`METASTREAM_CONFIG`, `./metastream.toml`, or
//! defaults), registers every configured source, and serves
//! `GET /api/search?query=` until Ctrl-C.

use metastream::{MetaStreamConfig, SearchServer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MetaStreamConfig::load()?;
    metastream::init_logging(&config.server.log_level);

    match MetaStreamConfig::config_path() {
        Some(path) => tracing::info!(path = %path.display(), "config loaded"),
        None => tracing::info!("no config file found, using defaults"),
    }

    let aggregator = config.build_aggregator().map_err(|e| {
        tracing::error!(error = %e, "failed to build source registry");
        anyhow::anyhow!("metastream failed to start: {e}")
    })?;
    tracing::info!(
        registered = aggregator.registry().len(),
        enabled = aggregator.registry().list_enabled().len(),
        "sources ready"
    );

    let server = SearchServer::start(Arc::new(aggregator), &config.server).await?;
    tracing::info!("metastream running at http://{}", server.addr());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown();
    Ok(())
}
