//! Stream Manager CLI
//!
//! A command-line tool for matching and renaming a remote video catalog using TMDB and AI.

use clap::Parser;
use stream_manager::cli::{
    args::{CacheAction, Cli, Commands, RenameAction},
    commands::{cache, duplicates, matching, parse, rename, search},
};
use stream_manager::models::config::{load_config, Config};
use stream_manager::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config = load_config()?;
    let use_ai = !cli.no_ai;

    // Commands that reach the catalog or TMDB get preflight checks
    let needs_network = match &cli.command {
        Commands::Parse { .. } | Commands::Cache { .. } => false,
        Commands::Rename { action } => {
            matches!(action, RenameAction::Batch | RenameAction::Approve { .. } | RenameAction::Manual { .. })
        }
        _ => true,
    };
    if needs_network && !cli.skip_preflight {
        let check_ai = use_ai && matches!(
            cli.command,
            Commands::Rename { action: RenameAction::Batch }
        );
        run_preflight_checks(&config, check_ai).await?;
    }

    match cli.command {
        Commands::Parse { names, json } => {
            parse::parse_names(&names, json)?;
        }

        Commands::Match { slug, tmdb_id } => {
            matching::match_video(&config, slug, tmdb_id).await?;
        }

        Commands::Search { query, exact, organize } => {
            search::search(&config, &query, exact, organize).await?;
        }

        Commands::Rename { action } => match action {
            RenameAction::Batch => rename::batch(&config, use_ai).await?,
            RenameAction::Pending => rename::pending(&config)?,
            RenameAction::Approve { id } => rename::approve(&config, &id).await?,
            RenameAction::Reject { id } => rename::reject(&config, &id)?,
            RenameAction::Manual { id, name } => rename::manual(&config, &id, &name).await?,
        },

        Commands::Duplicates => {
            duplicates::scan_duplicates(&config).await?;
        }

        Commands::Cache { action } => match action {
            CacheAction::Sweep => cache::sweep(&config).await?,
            CacheAction::Stats => cache::stats(&config).await?,
        },
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("stream_manager=debug")
    } else {
        EnvFilter::new("stream_manager=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(config: &Config, check_ai: bool) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(config, check_ai).await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
