// ABOUTME: Serve command implementation.
// ABOUTME: Binds the listener and runs the dashboard until Ctrl-C.

use deploylog::config::Config;
use deploylog::dashboard::{self, Dashboard, Renderer};
use deploylog::error::Result;
use deploylog::output::Output;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::{Completion, open_backend};

pub async fn serve(
    config: &Config,
    listen: Option<SocketAddr>,
    output: &Output,
) -> Result<Completion> {
    let backend = open_backend(config).await?;
    let listener = TcpListener::bind(listen.unwrap_or(config.listen)).await?;
    output.progress(&format!(
        "Serving deploy history on http://{}",
        listener.local_addr()?
    ));

    let dashboard = Arc::new(Dashboard::new(
        backend,
        Renderer::new(config.display_offset),
    ));
    dashboard::serve(listener, dashboard, shutdown_signal()).await;

    Ok(Completion::Done)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C, serving until killed: {}", e);
        std::future::pending::<()>().await;
    }
}
