mod auth;
mod catalog;
mod clock;
mod config;
mod maintenance;
mod storage;
mod web;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{config::SiteConfig, web::AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    if let Err(err) = app_main().await {
        error!(?err, "application error");
        std::process::exit(1);
    }
}

async fn app_main() -> Result<()> {
    let config = SiteConfig::from_env();
    if config.admin.uses_default_password() {
        warn!(
            production = config.production,
            "admin login uses the built-in default password"
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let poll = config.session_poll;
    let state = AppState::new(config)?;

    maintenance::spawn(state.monitor().clone(), poll);

    let app = web::router::build_router(state);
    info!(%addr, "listening");

    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
