use clap::Parser;
use tracing_subscriber::EnvFilter;

use quadrafacil::cli::utils::output_error;
use quadrafacil::cli::{Cli, OutputFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);
    let config = quadrafacil::config::config();

    if let Err(e) = quadrafacil::cli::run(cli, config).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => output_error(&output_format, &e.to_string(), None)?,
        }
        std::process::exit(1);
    }

    Ok(())
}
