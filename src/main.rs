use tracing::metadata::LevelFilter;
use tracing::{error, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() {
    if let Err(err) = try_main().await {
        error!("Exiting with an error...\n{err:?}");
        std::process::exit(1);
    }
}

async fn try_main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .with_env_var("STICKERSET_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    // Configuration may come from a `.env` file, but it's not required to exist
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            warn!(err = &err as &dyn std::error::Error, "Failed to load the `.env` file");
        }
    }

    stickerset::run().await
}
