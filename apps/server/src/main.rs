//! DevPulse server: sync-and-cache backend for the productivity dashboard.

mod api;
mod config;
mod error;
mod events;
mod state;

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(
        "configuration: github {}, jira {}, {} repos, project {}, stale after {}h",
        if config.github_token.is_some() { "configured" } else { "missing" },
        if config.jira_base_url.is_some() && config.jira_token.is_some() {
            "configured"
        } else {
            "missing"
        },
        config.repos.len(),
        config.project_key,
        config.stale_hours,
    );

    let port = config.port;
    let state = build_state(config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
