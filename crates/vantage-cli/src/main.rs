//! Vantage CLI - Strategic insights analytics
//!
//! Usage:
//!   vantage serve --port 5000          Start the web server
//!   vantage import --file data.json    Load a dataset into SQLite
//!   vantage query --topic oil          Query insight records
//!   vantage stats                      Show dataset statistics

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve {
            port,
            host,
            source,
            static_dir,
        } => {
            let mut config = commands::load_config(config_path, &source)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }
            commands::cmd_serve(config).await
        }
        Commands::Import { file, db, keep } => {
            let config = commands::load_config(config_path, &SourceArgs::default())?;
            let file = file.unwrap_or(config.data.json_path);
            let db = db.unwrap_or(config.data.db_path);
            commands::cmd_import(&file, &db, keep).map(|_| ())
        }
        Commands::Query {
            query,
            source,
            json,
        } => {
            let config = commands::load_config(config_path, &source)?;
            let store = commands::open_source(&config.data)?;
            commands::cmd_query(store.as_ref(), query.into_params(), json)
        }
        Commands::Show { id, source, json } => {
            let config = commands::load_config(config_path, &source)?;
            let store = commands::open_source(&config.data)?;
            commands::cmd_show(store.as_ref(), &id, json)
        }
        Commands::Filters { source, json } => {
            let config = commands::load_config(config_path, &source)?;
            let store = commands::open_source(&config.data)?;
            commands::cmd_filters(store.as_ref(), json)
        }
        Commands::Stats { source, json } => {
            let config = commands::load_config(config_path, &source)?;
            let store = commands::open_source(&config.data)?;
            commands::cmd_stats(store.as_ref(), json)
        }
        Commands::Status { source } => {
            let config = commands::load_config(config_path, &source)?;
            commands::cmd_status(&config)
        }
    }
}
