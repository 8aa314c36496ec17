use tracing_subscriber::EnvFilter;

use quadrafacil::{config, is_development, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_SECRET, etc.
    let _ = dotenvy::dotenv();

    let default_filter = if is_development!() { "quadrafacil=debug,tower_http=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting QuadraFácil API in {:?} mode", config.environment);

    server::serve(config.clone()).await
}
