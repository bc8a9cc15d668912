//! Command-line interface
//!
//! A thin caller over the SDK: every subcommand loads configuration, builds
//! a client and prints fetched records as pretty JSON. No pipeline logic
//! lives here.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::SuperOpsClient;
use crate::api::query::DetailLevel;
use crate::config::SuperOpsConfig;

#[derive(Parser)]
#[command(name = "superops", about = "CLI for the SuperOps API", version)]
pub struct Cli {
    /// Fetch full entity detail instead of the core fields
    #[arg(long, global = true)]
    pub full: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Service desk tickets
    Tickets {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Managed clients
    Clients {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Managed assets
    Assets {
        #[command(subcommand)]
        action: EntityAction,
    },
}

#[derive(Subcommand)]
pub enum EntityAction {
    /// List records
    List {
        /// Records per page
        #[arg(long, default_value_t = 25)]
        page_size: u32,
        /// Stop after this many records
        #[arg(long)]
        max: Option<usize>,
    },
    /// Fetch one record by ID
    Get { id: String },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = SuperOpsConfig::load()?;
    let client = SuperOpsClient::new(config)?;
    let detail = if cli.full {
        DetailLevel::Full
    } else {
        DetailLevel::Core
    };

    match cli.command {
        Commands::Tickets { action } => match action {
            EntityAction::List { page_size, max } => {
                let mut pager = client
                    .tickets()
                    .with_detail(detail)
                    .list_with_page_size(None, page_size)?;
                print_items(&mut pager, max).await
            }
            EntityAction::Get { id } => {
                let ticket = client.tickets().with_detail(detail).get(&id).await?;
                print_record(&ticket)
            }
        },
        Commands::Clients { action } => match action {
            EntityAction::List { page_size, max } => {
                let mut pager = client
                    .clients()
                    .with_detail(detail)
                    .list_with_page_size(None, page_size)?;
                print_items(&mut pager, max).await
            }
            EntityAction::Get { id } => {
                let record = client.clients().with_detail(detail).get(&id).await?;
                print_record(&record)
            }
        },
        Commands::Assets { action } => match action {
            EntityAction::List { page_size, max } => {
                let mut pager = client
                    .assets()
                    .with_detail(detail)
                    .list_with_page_size(None, page_size)?;
                print_items(&mut pager, max).await
            }
            EntityAction::Get { id } => {
                let record = client.assets().with_detail(detail).get(&id).await?;
                print_record(&record)
            }
        },
    }
}

async fn print_items<T: serde::Serialize + serde::de::DeserializeOwned>(
    pager: &mut crate::api::Pager<T>,
    max: Option<usize>,
) -> Result<()> {
    let mut printed = 0usize;
    while let Some(item) = pager.next_item().await? {
        println!("{}", serde_json::to_string_pretty(&item)?);
        printed += 1;
        if max.is_some_and(|max| printed >= max) {
            break;
        }
    }
    eprintln!("{printed} records ({} pages)", pager.pages_fetched());
    Ok(())
}

fn print_record<T: serde::Serialize>(record: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
