//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vantage_core::QueryParams;

/// Vantage - Strategic insights analytics
#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Filter and aggregate strategic insight records", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config override file (default: ~/.local/share/vantage/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Data source selection, overriding config and environment
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// Data source: json or sqlite
    #[arg(long)]
    pub source: Option<String>,

    /// JSON dataset file
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// SQLite database path
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Re-read the JSON dataset on every request
    #[arg(long)]
    pub reload: bool,
}

/// Filter, search, sort and pagination options
#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    #[arg(long)]
    pub end_year: Option<String>,

    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long)]
    pub sector: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub pestle: Option<String>,

    /// Publisher of the insight (the record's `source` field)
    #[arg(long = "insight-source")]
    pub insight_source: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    /// Case-insensitive text search over title, insight, topic and sector
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page number (1-indexed)
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Records per page (default 50, max 1000)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Sort field (added, published, intensity, likelihood, relevance, title, ...)
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort order: asc or desc
    #[arg(long)]
    pub sort_order: Option<String>,
}

impl QueryArgs {
    /// Convert to the raw parameters the API accepts, validated downstream
    pub fn into_params(self) -> QueryParams {
        QueryParams {
            end_year: self.end_year,
            topic: self.topic,
            sector: self.sector,
            region: self.region,
            pestle: self.pestle,
            source: self.insight_source,
            country: self.country,
            search: self.search,
            limit: self.limit.map(|l| l.to_string()),
            page: self.page.map(|p| p.to_string()),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Directory containing the built dashboard to serve (e.g., frontend/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Load a JSON dataset into the SQLite store
    Import {
        /// JSON dataset file (default: configured data path)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// SQLite database path (default: configured db path)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Keep existing records instead of replacing them
        #[arg(long)]
        keep: bool,
    },

    /// Query insight records
    Query {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one insight record
    Show {
        /// Insight id
        id: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the values each filter can take
    Filters {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the options as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dataset statistics and breakdowns
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration and data source status
    Status {
        #[command(flatten)]
        source: SourceArgs,
    },
}
