//! Parlor CLI and REST API entry point.
//!
//! Binary name: `parlor`
//!
//! Loads configuration, initializes tracing and the database, then dispatches
//! to a one-shot command or starts the REST API server with its reaper.

mod cli;
mod http;
mod state;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands};
use parlor_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let loaded = parlor_infra::config::load_config(cli.config.as_deref()).await;
    let mut config = loaded.config;

    init_tracing(&TracingOptions {
        default_filter: cli.log_filter().to_string(),
        json: config.telemetry.json,
        otel: config.telemetry.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    for warning in &loaded.warnings {
        tracing::warn!("{warning}");
    }

    if let Commands::Serve { port, host } = &cli.command {
        if let Some(port) = port {
            config.server.port = *port;
        }
        if let Some(host) = host {
            config.server.host = host.clone();
        }
    }

    let state = AppState::init(config).await?;

    let result = match cli.command {
        Commands::Serve { .. } => serve(state).await,
        Commands::Participants => cli::participant::list_participants(&state, cli.json).await,
        Commands::Messages { user, limit } => {
            cli::message::list_messages(&state, &user, limit, cli.json).await
        }
        Commands::Reap => cli::reap::reap(&state, cli.json).await,
    };

    shutdown_tracing();
    result
}

/// Run the HTTP API until Ctrl+C or SIGTERM, with the reaper alongside.
async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let reaper = state.reaper.clone().start(CancellationToken::new());

    println!(
        "  {} Parlor listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());
    tracing::info!(%addr, "Server started");

    let router = http::router::build_router(state);
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    reaper.stop().await;
    println!("\n  Server stopped.");

    served.map_err(Into::into)
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
