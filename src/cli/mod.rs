//! Command-line interface for running the tabflow workflows

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::data::{is_numeric_dtype, FeatureStats};
use crate::tasks::RegressionMetrics;
use crate::workflows::{self, NUM_HOUSES_PER_LOCATION};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn print_metrics(metrics: &RegressionMetrics) {
    println!();
    println!("  {:<8} {}", muted("MSE"), format!("{:.4}", metrics.mse).white());
    println!("  {:<8} {}", muted("RMSE"), format!("{:.4}", metrics.rmse).white());
    println!("  {:<8} {}", muted("MAE"), format!("{:.4}", metrics.mae).white());
    println!(
        "  {:<8} {}",
        muted("R²"),
        format!("{:.4}", metrics.r2).white().bold()
    );
    println!();
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tabflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tabular regression workflow pipelines")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the housing price workflow (linear regression)
    Housing,

    /// Run the customer lifetime value workflow (random forest)
    CustomerLtv,

    /// Run the house price trainer (synthetic data + gradient boosting)
    HousePrice {
        /// Location name used for the model artifact
        #[arg(short, long, default_value = "main")]
        location: String,

        /// Generation seed
        #[arg(short, long, default_value = "7")]
        seed: u64,

        /// Number of houses to generate
        #[arg(long, default_value_t = NUM_HOUSES_PER_LOCATION)]
        houses: usize,

        /// Directory for model artifacts
        #[arg(short, long, default_value = ".")]
        workdir: PathBuf,
    },

    /// Show per-column statistics for a CSV file
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_housing() -> anyhow::Result<()> {
    section("Housing price workflow");

    step_run("Running pipeline");
    let start = Instant::now();
    let metrics = workflows::housing::run()?;
    step_done(&format!("{:?}", start.elapsed()));

    print_metrics(&metrics);
    Ok(())
}

pub fn cmd_customer_ltv() -> anyhow::Result<()> {
    section("Customer LTV workflow");

    step_run("Running pipeline");
    let start = Instant::now();
    let metrics = workflows::customer_ltv::run()?;
    step_done(&format!("{:?}", start.elapsed()));

    print_metrics(&metrics);
    Ok(())
}

pub fn cmd_house_price(
    location: &str,
    seed: u64,
    houses: usize,
    workdir: &PathBuf,
) -> anyhow::Result<()> {
    section("House price trainer");

    step_run(&format!("Training for {}", location.cyan()));
    let start = Instant::now();
    let predictions = workflows::house_price_trainer(location, seed, houses, workdir)?;
    step_done(&format!("{:?}", start.elapsed()));

    let n_preview = predictions.len().min(5);
    println!();
    println!(
        "  {:<14} {}",
        muted("Predictions"),
        predictions.len().to_string().white()
    );
    for (i, p) in predictions.iter().take(n_preview).enumerate() {
        println!("  {:<14} {}", muted(&format!("  [{i}]")), format!("{p:.2}").white());
    }
    println!(
        "  {:<14} {}",
        muted("Artifact"),
        workdir
            .join(format!("model-{location}.json"))
            .display()
            .to_string()
            .white()
    );
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Data info");

    step_run("Loading data");
    let df = crate::data::loader::DataLoader::load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    println!();
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if is_numeric_dtype(series.dtype()) {
            let stats = FeatureStats::from_numeric_series(series.name().as_str(), series)?;
            println!(
                "  {:<20} {} {}",
                series.name().to_string().white(),
                muted(&format!("mean {:>12.3}", stats.mean.unwrap_or(f64::NAN))),
                muted(&format!(
                    "std {:>12.3}  nulls {}",
                    stats.std.unwrap_or(f64::NAN),
                    stats.null_count
                )),
            );
        } else {
            println!(
                "  {:<20} {}",
                series.name().to_string().white(),
                muted(&format!("{} ({} nulls)", series.dtype(), series.null_count())),
            );
        }
    }
    println!();
    Ok(())
}
