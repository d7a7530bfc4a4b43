//! # docseed CLI
//!
//! Command-line interface for the seed reconciliation routine. All commands
//! accept a `--config` flag pointing to a TOML configuration file.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docseed init` | Create the SQLite database and the metadata table |
//! | `docseed status` | Show seeded vs expected document counts |
//! | `docseed reconcile [--force]` | Seed missing rows (or overwrite all with `--force`) |
//! | `docseed verify` | Check backing files in the content store |
//! | `docseed list` | List seeded documents, newest first |
//! | `docseed bootstrap` | Run the full startup sequence (init → status → seed → verify) |

mod bootstrap;
mod catalog;
mod config;
mod db;
mod error;
mod list;
mod migrate;
mod models;
mod reconcile;
mod store;
mod verify;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docseed — reconcile the document metadata store against a fixed catalog.
#[derive(Parser)]
#[command(
    name = "docseed",
    about = "Reconcile the document metadata store against a fixed seed catalog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docseed.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the document_metadata table.
    /// Idempotent — running it multiple times is safe.
    Init,

    /// Show the current seeding status.
    ///
    /// Prints seeded vs expected counts and a completion percentage.
    /// A store failure is reported as an error line, not a crash.
    Status,

    /// Seed the metadata store from the catalog.
    ///
    /// Inserts a row for every catalog entry not yet present. Skips
    /// entirely when the store is already complete.
    Reconcile {
        /// Overwrite existing rows with current catalog values.
        #[arg(long)]
        force: bool,
    },

    /// Verify that each catalog entry's backing file exists.
    ///
    /// Purely observational: reads the content store only, never the
    /// metadata store.
    Verify,

    /// List seeded documents, most recently written first.
    List,

    /// Run the full startup sequence.
    ///
    /// init → status → reconcile (if incomplete) → verify, with every
    /// step's failure logged and swallowed. Always exits 0.
    Bootstrap,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docseed=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Status => {
            reconcile::run_status(&cfg).await?;
        }
        Commands::Reconcile { force } => {
            reconcile::run_reconcile(&cfg, force).await?;
        }
        Commands::Verify => {
            verify::run_verify(&cfg).await?;
        }
        Commands::List => {
            list::run_list(&cfg).await?;
        }
        Commands::Bootstrap => {
            bootstrap::run_bootstrap(&cfg).await;
        }
    }

    Ok(())
}
