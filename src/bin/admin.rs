//! CLI administration tool for redirect-resolver.
//!
//! Manages redirect rules, shows hit statistics and checks destinations
//! without going through the HTTP admin API.
//!
//! # Usage
//!
//! ```bash
//! # List rules
//! cargo run --bin admin -- redirect list
//!
//! # Add a permanent redirect
//! cargo run --bin admin -- redirect add /old-page /new-page --type 301
//!
//! # Mark a page as gone
//! cargo run --bin admin -- redirect add /retired --type 410
//!
//! # Disable or remove a rule (by id or source)
//! cargo run --bin admin -- redirect disable /old-page
//! cargo run --bin admin -- redirect remove 12
//!
//! # Find destinations that no longer resolve
//! cargo run --bin admin -- redirect check-links
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`), pool settings, and
//! `SITE_URL` for checking relative destinations.
//!
//! Changes made here reach running servers once their rule cache expires
//! (`REDIRECT_CACHE_TTL_SECONDS`).

use redirect_resolver::application::services::{
    LinkChecker, LinkStatus, RedirectInput, RedirectService, RedirectUpdate,
};
use redirect_resolver::config::{self, Config};
use redirect_resolver::domain::entities::RedirectRule;
use redirect_resolver::infrastructure::persistence::PgRedirectRepository;
use redirect_resolver::server::connect_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

type Service = RedirectService<PgRedirectRepository>;

/// CLI tool for managing redirect-resolver.
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
    /// Manage redirect rules
    Redirect {
        #[command(subcommand)]
        action: RedirectCommand,
    },

    /// Show statistics
    Stats {
        /// Number of most-hit rules to show
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Redirect rule subcommands.
#[derive(Subcommand)]
enum RedirectCommand {
    /// List rules
    List {
        /// Only active rules
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Only inactive rules
        #[arg(long)]
        inactive: bool,
    },

    /// Add a rule
    Add {
        /// Source path, e.g. /old-page
        source: String,

        /// Destination path or http(s) URL; omit for 410/451
        destination: Option<String>,

        /// Status: 301, 302, 307, 308, 410 or 451
        #[arg(short = 't', long = "type", default_value_t = 301)]
        status: u16,

        /// Create the rule disabled
        #[arg(long)]
        inactive: bool,
    },

    /// Remove a rule
    Remove {
        /// Rule id or source path
        id_or_source: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Enable a rule
    Enable {
        /// Rule id or source path
        id_or_source: String,
    },

    /// Disable a rule
    Disable {
        /// Rule id or source path
        id_or_source: String,
    },

    /// Check every active destination over HTTP
    CheckLinks {
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Requests in flight
        #[arg(short, long, default_value_t = 8)]
        concurrency: usize,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Redirect { action } => handle_redirect_action(action, &pool, &config).await?,
        Commands::Stats { top } => handle_stats(&pool, top).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches redirect management commands.
async fn handle_redirect_action(
    action: RedirectCommand,
    pool: &PgPool,
    config: &Config,
) -> Result<()> {
    let service = RedirectService::new(Arc::new(PgRedirectRepository::new(Arc::new(
        pool.clone(),
    ))));

    match action {
        RedirectCommand::List { active, inactive } => {
            let filter = match (active, inactive) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            list_redirects(&service, filter).await?;
        }
        RedirectCommand::Add {
            source,
            destination,
            status,
            inactive,
        } => {
            let input = RedirectInput {
                source,
                destination,
                status,
                is_active: !inactive,
            };
            add_redirect(&service, input).await?;
        }
        RedirectCommand::Remove { id_or_source, yes } => {
            remove_redirect(&service, &id_or_source, yes).await?;
        }
        RedirectCommand::Enable { id_or_source } => {
            set_active(&service, &id_or_source, true).await?;
        }
        RedirectCommand::Disable { id_or_source } => {
            set_active(&service, &id_or_source, false).await?;
        }
        RedirectCommand::CheckLinks {
            timeout,
            concurrency,
        } => {
            check_links(&service, config, timeout, concurrency).await?;
        }
    }

    Ok(())
}

/// Lists rules as a table.
///
/// # Output Format
///
/// ```text
/// Redirects
///
///   ID   Type Source                         Destination                    Hits     Status
///   ─────────────────────────────────────────────────────────────────────────────────────────
///   1    301  /old-page                      /new-page                      42       ACTIVE
///   2    410  /retired                                                      3        INACTIVE
/// ```
async fn list_redirects(service: &Service, active: Option<bool>) -> Result<()> {
    println!("{}", "Redirects".bright_blue().bold());
    println!();

    let rules = service
        .list(active)
        .await
        .context("Failed to list redirects")?;

    if rules.is_empty() {
        println!("{}", "  No redirects found".yellow());
        println!();
        println!(
            "  Create one with: {} admin redirect add /old /new",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<4} {:<30} {:<30} {:<8} {}",
        "ID".bright_white().bold(),
        "Type".bright_white().bold(),
        "Source".bright_white().bold(),
        "Destination".bright_white().bold(),
        "Hits".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(89).bright_black());

    for rule in &rules {
        print_rule_row(rule);
    }

    println!();
    println!("  Total: {}", rules.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn print_rule_row(rule: &RedirectRule) {
    let status = if rule.is_active {
        "ACTIVE".green()
    } else {
        "INACTIVE".red()
    };

    println!(
        "  {:<4} {:<4} {:<30} {:<30} {:<8} {}",
        rule.id.to_string().bright_black(),
        rule.kind.to_string().bright_white(),
        rule.source.cyan(),
        rule.destination,
        rule.hits.to_string().bright_black(),
        status
    );
}

async fn add_redirect(service: &Service, input: RedirectInput) -> Result<()> {
    println!("{}", "Add Redirect".bright_blue().bold());
    println!();

    let rule = service
        .create(input)
        .await
        .context("Failed to create redirect")?;

    println!("{}", "Redirect created".green().bold());
    println!();
    println!("  ID:          {}", rule.id.to_string().bright_black());
    println!("  Source:      {}", rule.source.cyan());
    println!("  Type:        {}", rule.kind.to_string().bright_white());
    if !rule.destination.is_empty() {
        println!("  Destination: {}", rule.destination.bright_yellow());
    }
    println!();

    Ok(())
}

/// Removes a rule after confirmation (default: No).
async fn remove_redirect(service: &Service, id_or_source: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "Remove Redirect".bright_blue().bold());
    println!();

    let rule = find_rule(service, id_or_source).await?;

    println!("  Source: {}", rule.source.cyan());
    println!("  ID:     {}", rule.id.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Remove this redirect?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete(rule.id)
        .await
        .context("Failed to remove redirect")?;

    println!();
    println!("{}", "Redirect removed".green().bold());
    println!();

    Ok(())
}

async fn set_active(service: &Service, id_or_source: &str, is_active: bool) -> Result<()> {
    let rule = find_rule(service, id_or_source).await?;

    if rule.is_active == is_active {
        println!(
            "{}",
            format!(
                "Redirect {} is already {}",
                rule.source,
                if is_active { "enabled" } else { "disabled" }
            )
            .yellow()
        );
        return Ok(());
    }

    let update = RedirectUpdate {
        is_active: Some(is_active),
        ..Default::default()
    };
    let rule = service
        .update(rule.id, update)
        .await
        .context("Failed to update redirect")?;

    println!(
        "{} {}",
        if is_active { "Enabled" } else { "Disabled" }.green().bold(),
        rule.source.cyan()
    );

    Ok(())
}

/// Resolves a numeric id or a source path to a rule.
async fn find_rule(service: &Service, id_or_source: &str) -> Result<RedirectRule> {
    let rule = match id_or_source.parse::<i64>() {
        Ok(id) => Some(service.get(id).await.context("Redirect not found")?),
        Err(_) => service
            .find_by_source(id_or_source)
            .await
            .context("Database error")?,
    };

    rule.with_context(|| format!("Redirect not found: {id_or_source}"))
}

/// Checks active destinations and prints broken ones.
///
/// Relative destinations are resolved against `SITE_URL` and skipped without it.
async fn check_links(
    service: &Service,
    config: &Config,
    timeout: u64,
    concurrency: usize,
) -> Result<()> {
    println!("{}", "Checking redirect destinations...".bright_blue());
    println!();

    let site_url = config
        .site_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("Invalid SITE_URL")?;

    let rules = service
        .list(Some(true))
        .await
        .context("Failed to list redirects")?;

    let checker = LinkChecker::new(site_url, Duration::from_secs(timeout), concurrency)
        .context("Failed to build HTTP client")?;
    let reports = checker.check(&rules).await;

    let mut broken = 0;
    let mut skipped = 0;

    for report in &reports {
        match &report.status {
            LinkStatus::Ok(code) => println!(
                "  {} {:<30} -> {} ({})",
                "OK  ".green(),
                report.source.cyan(),
                report.target,
                code
            ),
            LinkStatus::Broken(code) => {
                broken += 1;
                println!(
                    "  {} {:<30} -> {} ({})",
                    "FAIL".red().bold(),
                    report.source.cyan(),
                    report.target,
                    code.to_string().red()
                );
            }
            LinkStatus::Unreachable(reason) | LinkStatus::Invalid(reason) => {
                broken += 1;
                println!(
                    "  {} {:<30} -> {} ({})",
                    "FAIL".red().bold(),
                    report.source.cyan(),
                    report.target,
                    reason.red()
                );
            }
            LinkStatus::Skipped => {
                skipped += 1;
                println!(
                    "  {} {:<30} -> {} (set SITE_URL to check)",
                    "SKIP".yellow(),
                    report.source.cyan(),
                    report.target
                );
            }
        }
    }

    println!();
    println!(
        "  Checked: {}  Broken: {}  Skipped: {}",
        reports.len().to_string().bright_white().bold(),
        broken.to_string().red().bold(),
        skipped.to_string().yellow()
    );
    println!();

    Ok(())
}

/// Displays rule counts, total hits and the most-hit rules.
async fn handle_stats(pool: &PgPool, top: usize) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let rules_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM redirects")
        .fetch_one(pool)
        .await?;

    let active_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM redirects WHERE is_active")
        .fetch_one(pool)
        .await?;

    let hits_total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(hits), 0)::BIGINT FROM redirects")
        .fetch_one(pool)
        .await?;

    println!(
        "  Redirects:     {}",
        rules_count.to_string().bright_green().bold()
    );
    println!(
        "  Active:        {}",
        active_count.to_string().bright_green().bold()
    );
    println!(
        "  Hits:          {}",
        hits_total.to_string().bright_green().bold()
    );
    println!();

    let top_rules: Vec<(String, i64)> = sqlx::query_as(
        "SELECT source, hits FROM redirects WHERE hits > 0 ORDER BY hits DESC, id LIMIT $1",
    )
    .bind(top as i64)
    .fetch_all(pool)
    .await?;

    if !top_rules.is_empty() {
        println!("{}", "  Most hit:".bright_white().bold());
        for (source, hits) in &top_rules {
            println!("    {:<40} {}", source.cyan(), hits.to_string().bright_white());
        }
        println!();
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
