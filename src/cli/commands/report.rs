use clap::Subcommand;

use crate::cli::utils::parse_day;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, UserStore};
use crate::services::report_service::{summarize, ReportRange, ReportSummary};

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Print the dashboard summary for one user")]
    Summary {
        #[arg(long, help = "Email of the user to report on")]
        email: String,
        #[arg(long, help = "Inclusive start date (YYYY-MM-DD)")]
        from: Option<String>,
        #[arg(long, help = "Inclusive end date (YYYY-MM-DD)")]
        to: Option<String>,
    },
}

pub async fn handle(cmd: ReportCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ReportCommands::Summary { email, from, to } => {
            let range = ReportRange {
                from: from.as_deref().map(parse_day).transpose()?,
                to: to.as_deref().map(parse_day).transpose()?,
            };

            let store = DatabaseManager::open_store(config).await?;
            let email = email.trim().to_lowercase();
            let user = store
                .find_user_by_email(&email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", email))?;

            let summary = summarize(store.as_ref(), user.id, range).await?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                OutputFormat::Text => print!("{}", render_text(&user.email, &summary)),
            }
            Ok(())
        }
    }
}

fn render_text(email: &str, summary: &ReportSummary) -> String {
    let mut out = format!("Summary for {}\n", email);

    let bound = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("Period:   {} .. {}\n", bound(summary.range.from), bound(summary.range.to)));
    out.push_str(&format!(
        "Clients:  {} ({} active)\n",
        summary.clients.total, summary.clients.active
    ));
    out.push_str(&format!("Courts:   {} ({} active)\n", summary.courts.total, summary.courts.active));

    out.push_str(&format!("Receipts: {}\n", summary.receipts.count));
    for (status, count) in &summary.receipts.by_status {
        out.push_str(&format!("  {:<12} {}\n", status, count));
    }
    for (currency, total) in &summary.receipts.totals {
        out.push_str(&format!("  total {} {}\n", currency, total));
    }
    for month in &summary.receipts.monthly {
        out.push_str(&format!("  {} {} {}\n", month.month, month.currency, month.total));
    }

    out.push_str(&format!("Payments: {}\n", summary.payments.count));
    for (status, count) in &summary.payments.by_status {
        out.push_str(&format!("  {:<12} {}\n", status, count));
    }
    for (currency, total) in &summary.payments.totals {
        out.push_str(&format!("  total {} {}\n", currency, total));
    }

    out
}
