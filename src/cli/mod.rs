//! CLI for the moneta client.
//!
//! Provides subcommands for talking to a running records API:
//! - `status` - Check backend health
//! - `login` / `register` / `logout` / `whoami` / `refresh` - Session management
//! - `records list|show|add|edit|rm` - Manage income/expense records
//! - `prefs show|set` - Local display preferences

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::notify::NotificationBus;
use crate::records::{NewRecord, Record, RecordFilters, RecordKind, RecordPatch};
use crate::session::preferences::PreferencesUpdate;
use crate::session::{LoginRequest, RegisterRequest};
use crate::validation::{self, ValidationErrors};
use crate::AppContext;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "moneta")]
#[command(author, version, about = "A fast, lightweight personal finance tracker client", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "moneta.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API base URL to connect to
    #[arg(long, env = "MONETA_API_URL")]
    pub api_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check backend health
    Status,

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show the current user profile
    Whoami,

    /// Refresh the session token
    Refresh,

    /// Record management commands
    #[command(subcommand)]
    Records(RecordsCommands),

    /// Local preference commands
    #[command(subcommand)]
    Prefs(PrefsCommands),
}

/// Records subcommands
#[derive(Subcommand, Debug)]
pub enum RecordsCommands {
    /// List records
    List {
        /// Page to load
        #[arg(long, default_value = "1")]
        page: u32,
        /// Filter by record type (income or expense)
        #[arg(long = "type")]
        kind: Option<RecordKind>,
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
        /// Earliest record date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest record date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show one record
    Show {
        /// Record id
        id: String,
    },
    /// Add a record
    Add {
        #[arg(long = "type")]
        kind: RecordKind,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Record date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Update a record
    Edit {
        /// Record id
        id: String,
        #[arg(long = "type")]
        kind: Option<RecordKind>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a record
    Rm {
        /// Record id
        id: String,
    },
}

/// Prefs subcommands
#[derive(Subcommand, Debug)]
pub enum PrefsCommands {
    /// Show current preferences
    Show,
    /// Update preferences
    Set {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        currency: Option<String>,
    },
}

/// Run a CLI command against a wired [`AppContext`], then surface any queued
/// notifications. The HTTP layer owns failure presentation; this layer only
/// renders the queue and reports outcomes.
pub async fn run_command(cli: &Cli, ctx: &AppContext) -> Result<()> {
    let result = dispatch(cli, ctx).await;
    render_notifications(&ctx.notify);
    result
}

async fn dispatch(cli: &Cli, ctx: &AppContext) -> Result<()> {
    match &cli.command {
        Commands::Status => cmd_status(ctx).await,
        Commands::Login { email, password } => cmd_login(ctx, email, password).await,
        Commands::Register {
            email,
            password,
            name,
        } => cmd_register(ctx, email, password, name).await,
        Commands::Logout => cmd_logout(ctx).await,
        Commands::Whoami => cmd_whoami(ctx).await,
        Commands::Refresh => cmd_refresh(ctx).await,
        Commands::Records(command) => cmd_records(ctx, command).await,
        Commands::Prefs(command) => cmd_prefs(ctx, command),
    }
}

// ============================================================================
// Command Handlers
// ============================================================================

async fn cmd_status(ctx: &AppContext) -> Result<()> {
    println!("Connecting to {}...", ctx.config.api.base_url);
    let health = ctx.client.status().await?;

    let icon = if health.status == "ok" { "[OK]" } else { "[!!]" };
    println!("Status:   {} {}", icon, health.status);
    if let Some(version) = &health.version {
        println!("Version:  v{version}");
    }
    if let Some(timestamp) = health.timestamp {
        println!("Reported: {timestamp}");
    }
    Ok(())
}

async fn cmd_login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    ensure_valid(validation::validate_login(email, password))?;

    let user = ctx
        .session
        .login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;

    println!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn cmd_register(ctx: &AppContext, email: &str, password: &str, name: &str) -> Result<()> {
    ensure_valid(validation::validate_register(email, password, name))?;

    let user = ctx
        .session
        .register(&RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        })
        .await?;

    println!("Welcome, {}! Your account is ready.", user.name);
    Ok(())
}

async fn cmd_logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout().await;
    println!("Logged out");
    Ok(())
}

async fn cmd_whoami(ctx: &AppContext) -> Result<()> {
    ctx.session.check_auth().await;

    let Some(user) = ctx.session.user() else {
        bail!("Not logged in. Run `moneta login` first.");
    };

    println!("ID:         {}", user.id);
    println!("Name:       {}", user.name);
    println!("Email:      {}", user.email);
    println!("Active:     {}", if user.is_active { "yes" } else { "no" });
    println!("Created:    {}", user.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(last_login) = user.last_login_at {
        println!("Last login: {}", last_login.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

async fn cmd_refresh(ctx: &AppContext) -> Result<()> {
    if ctx.session.refresh_token().await {
        println!("Session token refreshed");
        Ok(())
    } else {
        bail!("Token refresh failed; the local session has been cleared")
    }
}

async fn cmd_records(ctx: &AppContext, command: &RecordsCommands) -> Result<()> {
    match command {
        RecordsCommands::List {
            page,
            kind,
            category,
            from,
            to,
        } => {
            ctx.records.set_page(*page);
            let filters = RecordFilters {
                kind: *kind,
                category: category.clone(),
                start_date: *from,
                end_date: *to,
            };
            let records = ctx.records.list(&filters).await?;
            print_records_table(ctx, &records);
            Ok(())
        }
        RecordsCommands::Show { id } => {
            let record = ctx.records.get_one(id).await?;
            print_record_detail(ctx, &record);
            Ok(())
        }
        RecordsCommands::Add {
            kind,
            amount,
            category,
            description,
            date,
        } => {
            ensure_valid(validation::validate_new_record(*amount, category))?;

            let record = ctx
                .records
                .create(&NewRecord {
                    kind: *kind,
                    amount: *amount,
                    category: category.clone(),
                    description: description.clone(),
                    record_date: date.unwrap_or_else(|| Utc::now().date_naive()),
                })
                .await?;
            println!(
                "Created {} record {} ({} {})",
                record.kind.as_str(),
                record.id,
                format_amount(ctx, record.amount),
                record.category
            );
            Ok(())
        }
        RecordsCommands::Edit {
            id,
            kind,
            amount,
            category,
            description,
            date,
        } => {
            if let Some(amount) = amount {
                ensure_valid({
                    let mut errors = ValidationErrors::new();
                    errors.check("amount", validation::validate_amount(*amount));
                    errors
                })?;
            }
            let patch = RecordPatch {
                kind: *kind,
                amount: *amount,
                category: category.clone(),
                description: description.clone(),
                record_date: *date,
            };
            if patch.is_empty() {
                bail!("Nothing to update: pass at least one of --type/--amount/--category/--description/--date");
            }
            let record = ctx.records.update(id, &patch).await?;
            println!("Updated record {}", record.id);
            Ok(())
        }
        RecordsCommands::Rm { id } => {
            ctx.records.delete(id).await?;
            println!("Deleted record {id}");
            Ok(())
        }
    }
}

fn cmd_prefs(ctx: &AppContext, command: &PrefsCommands) -> Result<()> {
    match command {
        PrefsCommands::Show => {}
        PrefsCommands::Set {
            theme,
            language,
            currency,
        } => {
            ctx.prefs.update(PreferencesUpdate {
                theme: theme.clone(),
                language: language.clone(),
                currency: currency.clone(),
            });
        }
    }

    let prefs = ctx.prefs.get();
    println!("Theme:    {}", prefs.theme);
    println!("Language: {}", prefs.language);
    println!("Currency: {}", prefs.currency);
    Ok(())
}

// ============================================================================
// Output Helpers
// ============================================================================

fn print_records_table(ctx: &AppContext, records: &[Record]) {
    if records.is_empty() {
        println!("No records on this page.");
        return;
    }

    println!(
        "{:<12} {:<12} {:<8} {:>12}  {:<14} {}",
        "ID", "DATE", "TYPE", "AMOUNT", "CATEGORY", "DESCRIPTION"
    );
    for record in records {
        println!(
            "{:<12} {:<12} {:<8} {:>12}  {:<14} {}",
            record.id,
            record.record_date.to_string(),
            record.kind.as_str(),
            format_amount(ctx, record.amount),
            record.category,
            record.description
        );
    }

    let stats = ctx.records.statistics();
    println!();
    println!(
        "This page: {} in, {} out, balance {} ({} records)",
        format_amount(ctx, stats.income),
        format_amount(ctx, stats.expense),
        format_amount(ctx, stats.balance),
        stats.count
    );
    println!(
        "Page {} of {} ({} records total)",
        ctx.records.current_page(),
        ctx.records.total_pages(),
        ctx.records.total()
    );
}

fn print_record_detail(ctx: &AppContext, record: &Record) {
    println!("ID:          {}", record.id);
    println!("Type:        {}", record.kind.as_str());
    println!("Amount:      {}", format_amount(ctx, record.amount));
    println!("Category:    {}", record.category);
    println!("Date:        {}", record.record_date);
    if !record.description.is_empty() {
        println!("Description: {}", record.description);
    }
    println!("Created:     {}", record.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated:     {}", record.updated_at.format("%Y-%m-%d %H:%M"));
}

fn format_amount(ctx: &AppContext, amount: f64) -> String {
    let currency = ctx.prefs.get().currency;
    let symbol = match currency.as_str() {
        "CNY" => "¥",
        "USD" => "$",
        "EUR" => "€",
        other => return format!("{amount:.2} {other}"),
    };
    format!("{symbol}{amount:.2}")
}

/// Print inline per-field messages and abort the command. Validation
/// failures never reach the notification queue.
fn ensure_valid(errors: ValidationErrors) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
    bail!("Validation failed")
}

fn render_notifications(bus: &NotificationBus) {
    for notification in bus.drain() {
        eprintln!("[{}] {}", notification.kind.as_str(), notification.message);
    }
}
