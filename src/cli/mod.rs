use clap::{Parser, Subcommand};

use crate::config;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "exhibit-api")]
#[command(about = "Exhibit API - exhibition catalogs, visitors, ratings and orders over HTTP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides EXHIBIT_API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(port).await,
        Commands::Migrate => {
            DatabaseManager::migrate().await?;
            DatabaseManager::close().await;
            Ok(())
        }
    }
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let settings = config::config();
    tracing::info!("Starting Exhibit API in {:?} mode", settings.environment);

    if settings.database.auto_migrate {
        // Keep serving; /health reports the store state.
        if let Err(e) = DatabaseManager::migrate().await {
            tracing::error!("Startup migration failed: {}", e);
        }
    }
    if crate::is_production!() && settings.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; every login will fail");
    }

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(settings.api.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Exhibit API listening on http://{}", bind_addr);

    axum::serve(listener, crate::app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["exhibit-api"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_serve_port() {
        let cli = Cli::parse_from(["exhibit-api", "serve", "--port", "8080"]);
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8080) })));
    }

    #[test]
    fn parses_migrate() {
        let cli = Cli::parse_from(["exhibit-api", "migrate"]);
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }
}
