//! Entry point for picare_agent. Parses args, starts the scheduler and the HTTP shell.

use anyhow::Context;
use picare_agent::config::{parse_args, AgentConfig, Cli, USAGE};
use picare_agent::runner::CommandRunner;
use picare_agent::scheduler::CollectionScheduler;
use picare_agent::state::AppState;
use picare_agent::{http, Collector, Pipeline, RelayClient};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args(std::env::args()) {
        Ok(Cli::Run(args)) => args,
        Ok(Cli::Help) => {
            println!("{USAGE}");
            return Ok(());
        }
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AgentConfig::resolve(args, |k| std::env::var(k).ok())?;

    let collector = Collector::new(
        CommandRunner::new(cfg.command_timeout),
        cfg.commands.clone(),
        cfg.device_id.clone(),
    );
    let relay = RelayClient::new(cfg.relay_url.clone(), cfg.relay_timeout)?;
    if relay.base_url().is_none() {
        info!("no relay url configured; snapshots are only returned locally");
    }
    let pipeline = Pipeline::new(collector, relay);

    // invalid cron fails here, before anything is bound
    let mut scheduler = CollectionScheduler::new(pipeline.clone(), &cfg.schedule)?;
    scheduler.start().await?;

    let app = http::router(AppState::new(pipeline, scheduler.schedule()));
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(device = %cfg.device_id, "picare_agent running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
