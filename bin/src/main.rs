//! leech CLI - Asynchronous magnet/torrent download job manager.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "leech")]
#[command(about = "Asynchronous magnet/torrent download job manager", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Base directory for job records and downloads (defaults to the
    /// platform data directory)
    #[arg(long, global = true)]
    store_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a download job and follow it to completion
    Fetch {
        /// Magnet link (omit when using --torrent)
        magnet: Option<String>,

        /// Path to a .torrent descriptor file
        #[arg(short, long)]
        torrent: Option<PathBuf>,

        /// Worker poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        poll_interval_ms: u64,

        /// Maximum concurrently running jobs (unbounded when omitted)
        #[arg(long)]
        max_concurrent: Option<usize>,
    },

    /// Show job status (a single job, or a listing)
    Status {
        /// Specific job ID to inspect
        job_id: Option<String>,

        /// Include finished jobs in the listing
        #[arg(long)]
        all: bool,
    },

    /// Stream live progress for a job as server-sent-event frames
    Watch {
        /// Job ID to watch
        job_id: String,

        /// Delay between frames in milliseconds
        #[arg(long, default_value = "1000")]
        tick_ms: u64,
    },

    /// Cancel a non-terminal job
    Cancel {
        /// Job ID to cancel
        job_id: String,
    },

    /// Remove finished job records from storage
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Fetch {
            magnet,
            torrent,
            poll_interval_ms,
            max_concurrent,
        } => {
            commands::fetch::fetch(
                magnet,
                torrent,
                poll_interval_ms,
                max_concurrent,
                cli.store_path,
                cli.quiet,
            )
            .await
        }
        Commands::Status { job_id, all } => {
            commands::status::status(job_id.as_deref(), all, cli.store_path).await
        }
        Commands::Watch { job_id, tick_ms } => {
            commands::watch::watch(&job_id, tick_ms, cli.store_path).await
        }
        Commands::Cancel { job_id } => commands::cancel::cancel(&job_id, cli.store_path).await,
        Commands::Clean => commands::clean::clean(cli.store_path).await,
    }
}

/// Initializes the tracing subscriber from `RUST_LOG` or the verbosity flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let fallback = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
