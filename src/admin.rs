//! Administrative command handlers.
//!
//! CLI entry points for maintenance: running migrations, purging expired
//! links and printing store-wide counts.

use crate::config::Config;
use crate::db::{self, Store, StoreSummary};
use crate::error::AppResult;
use chrono::Utc;
use clap::Subcommand;
use std::sync::Arc;
use tracing::info;

/// Administrative commands available via CLI.
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Delete short links past their expiry
    CleanExpired,

    /// Run database migrations
    Migrate,

    /// Show statistics
    Stats,
}

/// Run an administrative command with the given configuration.
pub async fn run(config: Config, admin_command: AdminCommands) -> AppResult<()> {
    let store = db::connect(&config.database).await?;

    match admin_command {
        AdminCommands::CleanExpired => clean_expired(store).await,
        AdminCommands::Migrate => migrate(store).await,
        AdminCommands::Stats => stats(store).await,
    }
}

async fn clean_expired(store: Arc<dyn Store>) -> AppResult<()> {
    info!("Cleaning expired URLs...");

    let deleted_count = store.delete_expired_urls(Utc::now()).await?;

    info!("Deleted {} expired URL(s)", deleted_count);
    Ok(())
}

async fn migrate(store: Arc<dyn Store>) -> AppResult<()> {
    info!("Running database migrations...");

    store.run_migrations().await?;

    info!("Migrations completed successfully");
    Ok(())
}

async fn stats(store: Arc<dyn Store>) -> AppResult<()> {
    info!("Fetching statistics...");

    let summary = store.summary(Utc::now()).await?;
    println!("{}", render_summary(&summary));

    Ok(())
}

fn render_summary(summary: &StoreSummary) -> String {
    format!(
        "\n=== curelink Statistics ===\n\
         Total URLs:      {}\n\
         Total Clicks:    {}\n\
         Active URLs:     {}\n\
         Expired URLs:    {}\n\
         Users:           {}\n",
        summary.total_urls,
        summary.total_clicks,
        summary.active_urls,
        summary.expired_urls,
        summary.total_users,
    )
}
