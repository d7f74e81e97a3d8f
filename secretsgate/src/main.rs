//! secretsgate - HTTP facade over AWS Secrets Manager
//!
//! Lists, creates, reads, updates and describes secrets on behalf of HTTP
//! callers. AWS credentials and region come from the SDK's ambient chain.

use clap::Parser;
use secretsgate::{build_state, create_router, Config, Overrides, StoreKind};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "secretsgate")]
#[command(about = "HTTP facade over AWS Secrets Manager", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./secretsgate.toml when present)
    #[arg(short, long, env = "SECRETSGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "SECRETSGATE_PORT")]
    port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "SECRETSGATE_HOST")]
    host: Option<String>,

    /// Secret store backend
    #[arg(long, value_enum, env = "SECRETSGATE_STORE")]
    store: Option<StoreKind>,

    /// AWS region (overrides the ambient configuration)
    #[arg(long, env = "SECRETSGATE_REGION")]
    region: Option<String>,

    /// AWS shared-config profile
    #[arg(long, env = "SECRETSGATE_PROFILE")]
    profile: Option<String>,

    /// Secrets Manager endpoint, e.g. a local emulator
    #[arg(long, env = "SECRETSGATE_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "SECRETSGATE_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "secretsgate={level},secretsgate_secretsmanager={level},secretsgate_core={level},tower_http=debug",
                    level = args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    config.apply(Overrides {
        host: args.host,
        port: args.port,
        store: args.store,
        region: args.region,
        profile: args.profile,
        endpoint_url: args.endpoint_url,
    });

    info!("Starting secretsgate...");
    let state = build_state(&config.store).await;
    let app = create_router(state);

    let listener = config.bind().await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("secretsgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
