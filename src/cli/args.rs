//! Command line argument definitions.

use clap::{Parser, Subcommand};

/// Stream Manager - Match and rename a remote video catalog with TMDB and AI
#[derive(Parser, Debug)]
#[command(name = "stream-manager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Disable the AI fallback parser
    #[arg(long, global = true)]
    pub no_ai: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse filenames with the local parser
    Parse {
        /// Filenames or slugs to parse
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the catalog video for a slug and/or TMDB ID
    Match {
        /// URL slug, e.g. movie/the-matrix-1999
        #[arg(long)]
        slug: Option<String>,

        /// TMDB ID
        #[arg(long)]
        tmdb_id: Option<u64>,
    },

    /// Search the video catalog
    Search {
        /// Search term (empty lists everything)
        #[arg(value_name = "QUERY", default_value = "")]
        query: String,

        /// Keep only videos whose normalized name contains the query
        #[arg(long)]
        exact: bool,

        /// Group series episodes and report missing ones
        #[arg(long)]
        organize: bool,
    },

    /// Rename catalog videos
    Rename {
        #[command(subcommand)]
        action: RenameAction,
    },

    /// Scan the catalog for duplicate videos
    Duplicates,

    /// Manage the match cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RenameAction {
    /// Rename every video in the catalog to its canonical name
    Batch,

    /// List AI suggestions awaiting approval
    Pending,

    /// Apply a pending AI suggestion
    Approve {
        /// Catalog video ID
        #[arg(value_name = "VIDEO_ID")]
        id: String,
    },

    /// Discard a pending AI suggestion
    Reject {
        /// Catalog video ID
        #[arg(value_name = "VIDEO_ID")]
        id: String,
    },

    /// Rename one video directly
    Manual {
        /// Catalog video ID
        #[arg(value_name = "VIDEO_ID")]
        id: String,

        /// New name
        #[arg(value_name = "NEW_NAME")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Remove expired entries
    Sweep,

    /// Show cache size and settings
    Stats,
}
