//! prodsearch - product search HTTP service
//!
//! `prodsearch serve` connects to MySQL (credentials from DB_USER,
//! DB_PASSWORD, DB_NAME) and serves `GET /search?query=...`.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "prodsearch",
    author,
    version,
    about = "Product name search over HTTP"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP search server
    Serve(commands::ServeArgs),
}

#[tokio::main]
async fn main() {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    if let Err(e) = run(cli).await {
        // The only fatal exit: bad configuration or a database that never answered
        tracing::error!(error = ?e, "fatal");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
    }
    Ok(())
}
