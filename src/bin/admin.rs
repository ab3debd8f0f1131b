//! CLI administration tool for tinylink.
//!
//! Manages users and API tokens, shows statistics, and checks the database
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a link owner
//! cargo run --bin admin -- user create --email alice@example.com
//!
//! # Issue a token for that user
//! cargo run --bin admin -- token create --email alice@example.com --name "CLI"
//!
//! # List and revoke tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke "CLI"
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
//! Same as the server. `DATABASE_URL` (or `DB_PATH`) selects the database and
//! `TOKEN_SIGNING_SECRET` must match the server's so issued tokens validate.

use tinylink::application::services::auth_service::hash_token;
use tinylink::config::{Config, load_from_env};
use tinylink::domain::repositories::{TokenRepository, UserRepository};
use tinylink::infrastructure::persistence::{SqliteTokenRepository, SqliteUserRepository};
use tinylink::server::connect_database;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::SqlitePool;
use std::sync::Arc;

/// CLI tool for managing tinylink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage link owners
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user
    Create {
        #[arg(short, long)]
        email: Option<String>,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List all users
    List,
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token for a user
    Create {
        /// Owner's email
        #[arg(short, long)]
        email: Option<String>,

        /// Token name (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

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
    let config = load_from_env()?;

    let pool = connect_database(&config).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool, &config).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &SqlitePool) -> Result<()> {
    let repo = SqliteUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Create { email, name } => create_user(&repo, email, name).await,
        UserAction::List => list_users(&repo).await,
    }
}

async fn create_user(
    repo: &SqliteUserRepository,
    email: Option<String>,
    name: Option<String>,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let email = email.trim().to_lowercase();

    if repo
        .find_by_email(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .is_some()
    {
        println!("{}", "⚠️  A user with this email already exists".yellow());
        return Ok(());
    }

    let user = repo
        .create(&email, name.filter(|n| !n.trim().is_empty()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!("{}", "✅ User created".green().bold());
    println!("  ID:    {}", user.id.to_string().bright_black());
    println!("  Email: {}", user.email.cyan());
    println!();

    Ok(())
}

async fn list_users(repo: &SqliteUserRepository) -> Result<()> {
    println!("{}", "📋 Users".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<35} {:<20} {}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for user in &users {
        println!(
            "  {:<5} {:<35} {:<20} {}",
            user.id.to_string().bright_black(),
            user.email.cyan(),
            user.display_name.as_deref().unwrap_or("-"),
            user.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &SqlitePool, config: &Config) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let tokens = SqliteTokenRepository::new(pool.clone());

    match action {
        TokenAction::Create {
            email,
            name,
            token,
            yes,
        } => {
            let users = SqliteUserRepository::new(pool);
            create_token(&tokens, &users, config, email, name, token, yes).await
        }
        TokenAction::List => list_tokens(&tokens).await,
        TokenAction::Revoke { name_or_id } => revoke_token(&tokens, name_or_id).await,
    }
}

/// Creates a new API token with interactive prompts.
///
/// # Flow
///
/// 1. Resolve the owner by email
/// 2. Prompt for token name (or use provided)
/// 3. Generate random token or use provided value
/// 4. Confirm creation (unless `--yes` flag)
/// 5. Store the keyed hash and show the raw token once
async fn create_token(
    tokens: &SqliteTokenRepository,
    users: &SqliteUserRepository,
    config: &Config,
    email: Option<String>,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Owner email").interact_text()?,
    };

    let owner = users
        .find_by_email(email.trim().to_lowercase().as_str())
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found, create it first with `admin user create`")?;

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            let generated = generate_token();
            println!("{}", "✨ Generated new token".green());
            generated
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Owner: {}", owner.email.cyan());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&config.token_signing_secret, &token_value);

    tokens
        .create_token(owner.id, &token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" {}/api/links",
        token_value.bright_yellow(),
        config.base_url.trim_end_matches('/')
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: &SqliteTokenRepository) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<6} {:<28} {:<18} {:<18} {}",
        "ID".bright_white().bold(),
        "User".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(88).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<6} {:<28} {:<18} {:<18} {}",
            token.id.to_string().bright_black(),
            token.user_id.to_string().bright_black(),
            token.name.cyan(),
            token.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", tokens.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is looked up as an ID, anything else as an exact name.
async fn revoke_token(repo: &SqliteTokenRepository, name_or_id: String) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "✅ Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

async fn handle_stats(pool: &SqlitePool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
        .fetch_one(pool)
        .await?;

    let active_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM short_links WHERE is_active = 1")
            .fetch_one(pool)
            .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM click_logs")
        .fetch_one(pool)
        .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!("  Users:         {}", users_count.to_string().bright_green().bold());
    println!(
        "  Links:         {} ({} active)",
        links_count.to_string().bright_green().bold(),
        active_count
    );
    println!("  Clicks:        {}", clicks_count.to_string().bright_green().bold());
    println!("  Active tokens: {}", tokens_count.to_string().bright_green().bold());
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &SqlitePool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT sqlite_version()")
                .fetch_one(pool)
                .await?;
            let journal: String = sqlx::query_scalar("PRAGMA journal_mode")
                .fetch_one(pool)
                .await?;

            println!("  SQLite:       {}", version.bright_white());
            println!("  Journal mode: {}", journal.bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a random 48-character alphanumeric token.
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
