//! CLI administration tool for link-shortener.
//!
//! Inspects and maintains the PostgreSQL link store without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # First page of links
//! cargo run --bin admin -- links list --limit 50
//!
//! # Delete a link (asks for confirmation)
//! cargo run --bin admin -- links delete promo
//!
//! # Write a CSV report to EXPORT_DIR and print its URL
//! cargo run --bin admin -- links export
//!
//! # Link and access totals
//! cargo run --bin admin -- stats
//!
//! # Check database connection / apply migrations
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `config` module); `DATABASE_URL` or the `DB_*`
//! components are required.

use link_shortener::application::error::LinkError;
use link_shortener::application::services::LinkService;
use link_shortener::config::Config;
use link_shortener::config::mask_connection_string;
use link_shortener::infrastructure::persistence::PgLinkRepository;
use link_shortener::server::{build_object_storage, connect_pool};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for managing link-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show link and access totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// List one page of links
    List {
        /// Page size (1-100)
        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Id of the last link of the previous page
        #[arg(short, long)]
        cursor: Option<Uuid>,
    },

    /// Show one link
    Show {
        /// Shortened URL key
        shortened_url: String,
    },

    /// Delete a link
    Delete {
        /// Shortened URL key
        shortened_url: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Export all links as a CSV report
    Export,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    if config.database_url.is_none() {
        anyhow::bail!("admin requires DATABASE_URL or DB_* settings");
    }

    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Links { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &config, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let object_storage = build_object_storage(config).await?;
    let service = LinkService::new(repository, object_storage, config.export_settings());

    match action {
        LinkAction::List { limit, cursor } => list_links(&service, limit, cursor).await?,
        LinkAction::Show { shortened_url } => show_link(&service, &shortened_url).await?,
        LinkAction::Delete { shortened_url, yes } => {
            delete_link(&service, &shortened_url, yes).await?
        }
        LinkAction::Export => export_links(&service).await?,
    }

    Ok(())
}

/// Prints one page of links.
///
/// # Output Format
///
/// ```text
/// Links
///
///   Key         Accesses  Created           Original URL
///   ──────────────────────────────────────────────────────────────────
///   promo       12        2025-01-15 10:30  https://example.com/promo
///
///   Next page: --cursor 0194b3c2-...
/// ```
async fn list_links(service: &LinkService, limit: u32, cursor: Option<Uuid>) -> Result<()> {
    println!("{}", "Links".bright_blue().bold());
    println!();

    let page = service
        .list_links(Some(limit), cursor)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if page.links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<11} {:<9} {:<17} {}",
        "Key".bright_white().bold(),
        "Accesses".bright_white().bold(),
        "Created".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &page.links {
        println!(
            "  {:<11} {:<9} {:<17} {}",
            link.shortened_url.cyan(),
            link.access_count,
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.original_url
        );
    }

    println!();
    if let Some(next) = page.next_cursor {
        println!("  Next page: {} {}", "--cursor".bright_cyan(), next);
        println!();
    }

    Ok(())
}

/// Prints every field of one link.
async fn show_link(service: &LinkService, shortened_url: &str) -> Result<()> {
    let link = match service.get_link(shortened_url).await {
        Ok(link) => link,
        Err(LinkError::NotFound) => {
            println!("{}", format!("No link named '{shortened_url}'").yellow());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to load link: {}", e)),
    };

    println!("  Id:           {}", link.id.to_string().bright_black());
    println!("  Key:          {}", link.shortened_url.cyan());
    println!("  Original URL: {}", link.original_url);
    println!(
        "  Accesses:     {}",
        link.access_count.to_string().bright_green().bold()
    );
    println!("  Created:      {}", link.created_at.to_rfc3339());

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(service: &LinkService, shortened_url: &str, skip_confirm: bool) -> Result<()> {
    let link = match service.get_link(shortened_url).await {
        Ok(link) => link,
        Err(LinkError::NotFound) => {
            println!("{}", format!("No link named '{shortened_url}'").yellow());
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to load link: {}", e)),
    };

    println!("  Key:          {}", link.shortened_url.cyan());
    println!("  Original URL: {}", link.original_url);
    println!("  Accesses:     {}", link.access_count);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(shortened_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "Link deleted".green().bold());

    Ok(())
}

/// Runs the CSV export into the local report directory.
async fn export_links(service: &LinkService) -> Result<()> {
    println!("{}", "Exporting links...".bright_blue());

    let url = service
        .export_links_to_csv()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", "Report written".green().bold());
    println!("  {}", url.bright_yellow());

    Ok(())
}

/// Displays totals across all links.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let (links, accesses): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(access_count), 0)::BIGINT FROM links")
            .fetch_one(pool)
            .await?;

    println!("  Links:    {}", links.to_string().bright_green().bold());
    println!("  Accesses: {}", accesses.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database maintenance commands.
async fn handle_db_action(action: DbAction, config: &Config, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            if let Some(url) = &config.database_url {
                println!("  Database: {}", mask_connection_string(url).bright_black());
            }
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to run migrations")?;

            println!("{}", "Migrations applied".green().bold());
        }
    }

    Ok(())
}
