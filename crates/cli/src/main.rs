//! jobsift entry point.
//!
//! Fetches the configured job board, filters the offers against the
//! configured criteria, and writes an HTML report. Logging goes to stderr
//! so the report path stays clean on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobsift_core::AppConfig;

mod pipeline;
mod report;

#[derive(Parser)]
#[command(name = "jobsift", version, about = "Fetch and filter job board offers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline and write an HTML report of matching offers.
    Generate {
        /// File the HTML report is written to.
        #[arg(long, default_value = "jobs_report.html")]
        output_file_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate { output_file_name } => generate(&output_file_name).await,
    }
}

async fn generate(output_file_name: &str) -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    let (offers, stats) = pipeline::run(&config).await.context("pipeline run failed")?;

    let html = report::render(&offers).context("failed to render report")?;
    std::fs::write(output_file_name, html)
        .with_context(|| format!("failed to write report to {output_file_name}"))?;

    println!(
        "Fetched {} offers ({} failed, {} skipped), {} matched criteria.",
        stats.fetched, stats.failed, stats.skipped, stats.matched
    );
    println!("Report saved as {output_file_name}");

    Ok(())
}
