//! LeadForge CLI: find, profile, and pitch B2B leads from the command line.
//!
//! Reads the operator's own site, searches for companies that need what they
//! sell, and drafts a personalized outreach email and portfolio for each one.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // Secrets such as SERPAPI_KEY may live in a local .env file.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
