//! tabflow - Main Entry Point
//!
//! Runs the tabular regression workflows from the command line.

use clap::Parser;
use tabflow::cli::{cmd_customer_ltv, cmd_house_price, cmd_housing, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabflow=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Housing => cmd_housing()?,
        Commands::CustomerLtv => cmd_customer_ltv()?,
        Commands::HousePrice {
            location,
            seed,
            houses,
            workdir,
        } => cmd_house_price(&location, seed, houses, &workdir)?,
        Commands::Info { data } => cmd_info(&data)?,
    }

    Ok(())
}
