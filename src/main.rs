use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::info;

use superops::cli::{Cli, run};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    info!("Starting superops CLI");

    if let Err(error) = run(cli).await {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }

    Ok(())
}
