mod avatar;
mod config;
mod error;
mod handlers;
mod issue;
mod server;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use config::ServerConfig;
use server::BoardServer;
use trackboard_store_sqlite::SqliteStore;

// ────────────────────────────────────── CLI Types ──────────────────────────────────────

#[derive(Parser)]
#[command(name = "trackboard-server")]
#[command(about = "Board permission service for the trackboard plugin")]
struct Cli {
    /// Database URL (sqlite://path/to/db.db)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:8474", env = "TRACKBOARD_ADDR")]
        addr: String,
    },
}

// ────────────────────────────────────── Main ──────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { addr } => serve(cli.database_url, &addr).await,
    }
}

async fn serve(
    database_url: Option<String>,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::resolve(addr, database_url)?;

    let store = Arc::new(SqliteStore::open(&config.database_url).await?);
    let board_server = BoardServer::new(store);
    let app = server::router(board_server);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("trackboard-server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM, shutting down gracefully");
        }
        _ = sigint.recv() => {
            tracing::info!("received SIGINT, shutting down gracefully");
        }
    }
}
