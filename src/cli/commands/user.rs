use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::AccountService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user that can log in with email and password")]
    Create {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Plain-text password, hashed before storing")]
        password: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
    },
}

pub async fn handle(cmd: UserCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { email, password, name } => {
            let store = DatabaseManager::open_store(config).await?;
            let accounts = AccountService::new(store, config.security.clone());

            let user = accounts.create(name, Some(email), Some(password)).await?;

            output_success(
                &output_format,
                &format!("Created user {} ({})", user.id, user.email),
                Some(json!({ "id": user.id, "email": user.email, "name": user.name })),
            )
        }
    }
}
