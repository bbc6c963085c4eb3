use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use notes_api::config::AppConfig;
use notes_api::database::{DatabaseManager, MemoryStorage, PgStorage};
use notes_api::AppState;

#[derive(Parser)]
#[command(name = "notes-api")]
#[command(about = "Notes API - per-user text notes behind JWT authentication")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, default_value = "0.0.0.0", help = "Address to bind")]
    host: String,

    #[arg(
        long,
        env = "NOTES_MEMORY_STORE",
        help = "Keep users and notes in memory instead of PostgreSQL"
    )]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and JWT_SECRET
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("notes_api=info,tower_http=info")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = notes_api::config::config().clone();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate().context("Invalid configuration")?;

    tracing::info!("Starting Notes API in {:?} mode", config.environment);

    let addr: SocketAddr = format!("{}:{}", args.host, config.api.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.host, config.api.port))?;

    let state = if args.memory {
        tracing::warn!("Using in-memory storage, data will not survive a restart");
        AppState::new(config, Arc::new(MemoryStorage::new()))?
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("Failed to connect to database")?;
        DatabaseManager::ensure_schema(&pool)
            .await
            .context("Failed to create database schema")?;
        AppState::new(config, Arc::new(PgStorage::new(pool)))?
    };

    let app = notes_api::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Notes API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, stopping...");
}
