//
// main.rs
// EOTRH-Score-rs
//
// Tokio entry point that configures tracing and hands off execution to the CLI
// layer so commands are resolved asynchronously.
//

use eotrh_score::cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    cli::run().await
}
