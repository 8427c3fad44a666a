use anyhow::{Context, Result};
use clap::Parser;
use sparkle_generator::api::{self, AppState};
use sparkle_generator::generator::ImageGenerator;
use sparkle_generator::models::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "sparkle-generator")]
#[command(about = "Serve the Sparkle image generation API")]
struct CliArgs {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl CliArgs {
    fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sparkle_generator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let addr = args.socket_addr()?;

    info!("Starting sparkle-generator");

    let config = Config::from_env().context("Failed to load configuration")?;
    if config.dry_run {
        warn!("DRY_RUN mode: generated images will not reach the CDN");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let generator = ImageGenerator::from_config(&config, shutdown_rx)
        .await
        .context("Failed to initialize image generator")?;

    let app = api::router(AppState {
        generator: Arc::new(generator),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested, interrupting pending retries");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["sparkle-generator"]);
        assert_eq!(args.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_cli_invalid_host() {
        let args = CliArgs::parse_from(["sparkle-generator", "--host", "not a host"]);
        let err = args.socket_addr().unwrap_err();
        assert!(err.to_string().contains("Invalid listen address"));
    }
}
