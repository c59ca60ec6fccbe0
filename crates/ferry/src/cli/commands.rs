//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ferry - move image assets from an object bucket to a CDN
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(about = "Move image assets from an object bucket to a CDN and clean up what is left behind", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the bundled defaults
    #[arg(long, global = true, env = "FERRY_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show migrated and pending counts for every collection
    Status,

    /// Migrate one batch of a collection
    Migrate {
        /// Collection to migrate (e.g. articles, stories)
        #[arg(value_name = "TYPE")]
        collection: String,

        /// Records per batch
        #[arg(long, default_value_t = ferry::DEFAULT_MIGRATE_BATCH)]
        batch_size: usize,

        /// Skip this many pending records
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Migrate a collection batch after batch until it is done
    Run {
        /// Collection to migrate
        #[arg(value_name = "TYPE")]
        collection: String,

        /// Records per batch
        #[arg(long, default_value_t = ferry::DEFAULT_MIGRATE_BATCH)]
        batch_size: usize,
    },

    /// Report unreferenced bucket objects, or delete them with --execute
    Cleanup {
        /// Delete orphans instead of reporting them
        #[arg(long)]
        execute: bool,

        /// Confirm deletion; required together with --execute
        #[arg(long)]
        yes: bool,

        /// Objects deleted per invocation
        #[arg(long, default_value_t = ferry::DEFAULT_CLEANUP_BATCH)]
        batch_size: usize,

        /// Orphan paths listed for review
        #[arg(long)]
        sample: Option<usize>,
    },

    /// Run a JSON invocation from --request or stdin
    Invoke {
        /// Request document; read from stdin when absent
        #[arg(long)]
        request: Option<String>,
    },
}
