pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "quadra")]
#[command(about = "QuadraFácil admin CLI - migrations, users and reports")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Reports over a user's data")]
    Report {
        #[command(subcommand)]
        cmd: commands::report::ReportCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, config, output_format).await,
        Commands::Report { cmd } => commands::report::handle(cmd, config, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_create() {
        let cli = Cli::try_parse_from([
            "quadra", "user", "create", "--email", "ana@quadra.com", "--password", "secret", "--name", "Ana",
        ])
        .unwrap();
        match cli.command {
            Commands::User {
                cmd: commands::user::UserCommands::Create { email, name, .. },
            } => {
                assert_eq!(email, "ana@quadra.com");
                assert_eq!(name.as_deref(), Some("Ana"));
            }
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from(["quadra", "report", "summary", "--email", "ana@quadra.com", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
    }
}
