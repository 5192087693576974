// ABOUTME: Marketplace admin CLI for dashboard stats, category management, and settings
// ABOUTME: Wires configuration, logging, SQLite storage and the cache into back-office commands
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
//!
//! Usage:
//! ```bash
//! # Render every stat over the standard ranges
//! marketplace-admin dashboard
//!
//! # Keep rendering when a stat fails
//! marketplace-admin dashboard --partial
//!
//! # Category tree management
//! marketplace-admin categories list
//! marketplace-admin categories create --name Books --slug books
//! marketplace-admin categories update 2 --name Fiction --slug fiction --parent 1
//! marketplace-admin categories delete 3
//! marketplace-admin categories sort 1=2 2=1
//!
//! # Effective configuration
//! marketplace-admin settings
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use marketplace_admin::{
    config::AdminConfig, database::AdminDatabase, errors::AppError, logging::LoggingConfig,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use helpers::display::print_error;

#[derive(Parser)]
#[command(
    name = "marketplace-admin",
    about = "Marketplace back-office CLI",
    long_about = "Dashboard statistics, category hierarchy management and settings for the marketplace back office."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Evaluate every dashboard stat over the standard time ranges
    Dashboard {
        /// Record failed stats instead of aborting
        #[arg(long)]
        partial: bool,

        /// Only print the given range column as (group, stat, value) rows
        #[arg(long)]
        range: Option<String>,
    },

    /// Category hierarchy commands
    Categories {
        #[command(subcommand)]
        action: CategoryCommand,
    },

    /// Show the effective configuration
    Settings,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum CategoryCommand {
    /// List categories with item counts, ordered by sort value
    List,

    /// Create a category
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// URL slug
        #[arg(long)]
        slug: String,

        /// Parent category id
        #[arg(long)]
        parent: Option<i64>,
    },

    /// Rename, reslug and reparent a category
    Update {
        /// Category id
        id: i64,

        /// New display name
        #[arg(long)]
        name: String,

        /// New URL slug
        #[arg(long)]
        slug: String,

        /// New parent category id (omit to make it a root)
        #[arg(long)]
        parent: Option<i64>,
    },

    /// Delete a category without items
    Delete {
        /// Category id
        id: i64,
    },

    /// Assign sort values as `id=sort` pairs
    Sort {
        /// Pairs such as `4=1 2=2`
        #[arg(required = true)]
        entries: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    logging.init()?;

    let mut config = AdminConfig::from_env()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }
    config.validate()?;
    info!("{}", config.summary());

    match run(cli.command, &config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Rejected mutations are reported, not propagated
        Err(e) if e.code.is_field_error() => {
            print_error(e)?;
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

async fn run(command: Command, config: &AdminConfig) -> Result<(), AppError> {
    match command {
        Command::Settings => commands::settings::show(config),
        Command::Dashboard { partial, range } => {
            let database = open_database(config).await?;
            commands::dashboard::show(config, database, partial, range.as_deref()).await
        }
        Command::Categories { action } => {
            let database = open_database(config).await?;
            match action {
                CategoryCommand::List => commands::categories::list(config, database).await,
                CategoryCommand::Create { name, slug, parent } => {
                    commands::categories::create(config, database, name, slug, parent).await
                }
                CategoryCommand::Update {
                    id,
                    name,
                    slug,
                    parent,
                } => commands::categories::update(config, database, id, name, slug, parent).await,
                CategoryCommand::Delete { id } => {
                    commands::categories::delete(config, database, id).await
                }
                CategoryCommand::Sort { entries } => {
                    commands::categories::sort(config, database, &entries).await
                }
            }
        }
    }
}

async fn open_database(config: &AdminConfig) -> Result<Arc<AdminDatabase>, AppError> {
    info!("Connecting to database: {}", config.database_url);
    Ok(Arc::new(AdminDatabase::new(&config.database_url).await?))
}
