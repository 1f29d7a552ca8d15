use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use prague_live::{
    client::GolemioClient,
    config::Config,
    logging,
    map::MapView,
    poller::{Poller, RouteSource},
    server,
    state::LiveState,
};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse().validate()?;
    logging::init(config.log_json)?;

    if config.api_key.is_empty() {
        tracing::warn!("no GOLEMIO_API_KEY configured, requests will likely be rejected");
    }

    let client = Arc::new(GolemioClient::new(&config)?);
    let state = Arc::new(LiveState::new(
        i64::try_from(config.poll_interval_secs).context("poll interval is too large")?,
    ));
    let route_source = config
        .routes_file
        .clone()
        .map_or(RouteSource::Api, RouteSource::File);

    let poller = Poller::new(
        client,
        Arc::clone(&state),
        config.poll_interval(),
        route_source,
    )
    .spawn();

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("could not bind {}", config.bind))?;

    let served = server::serve(
        listener,
        server::router(state, MapView::default()),
        shutdown_signal(),
    )
    .await;

    poller.shutdown().await;
    served.context("server stopped")
}
