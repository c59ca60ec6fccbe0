//! Ferry CLI binary.
//!
//! This binary provides command-line access to the migration engine:
//! - Report per-collection migration status
//! - Migrate one batch, or drive a collection to completion
//! - Report and delete orphaned bucket objects
//! - Run raw JSON invocations

use clap::Parser;
use ferry::{FerryConfig, LoggingConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, execute};

    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut logging = LoggingConfig::new().with_json_logs(cli.json_logs);
    if cli.verbose {
        logging = logging.with_log_level("debug");
    }
    init_logging(&logging)?;

    let config = match &cli.config {
        Some(path) => FerryConfig::from_file(path)?,
        None => FerryConfig::load()?,
    };

    if !execute(cli.command, config).await? {
        std::process::exit(1);
    }

    Ok(())
}
