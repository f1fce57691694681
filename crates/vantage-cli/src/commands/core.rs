//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides applied
//! - `open_source` - Open the configured data source

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use vantage_core::{open_store, AppConfig, DataSourceConfig, InsightStore};

use crate::cli::SourceArgs;

/// Load layered configuration and apply data source flags on top
pub fn load_config(config_path: Option<&Path>, source: &SourceArgs) -> Result<AppConfig> {
    let mut config = AppConfig::load(config_path).context("Failed to load configuration")?;
    apply_source_args(source, &mut config.data)?;
    Ok(config)
}

/// Apply `--source`, `--data`, `--db` and `--reload`
pub fn apply_source_args(args: &SourceArgs, data: &mut DataSourceConfig) -> Result<()> {
    if let Some(source) = &args.source {
        data.source = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(path) = &args.data {
        data.json_path = path.clone();
    }
    if let Some(path) = &args.db {
        data.db_path = path.clone();
    }
    if args.reload {
        data.reload = true;
    }
    Ok(())
}

/// Open the configured data source
pub fn open_source(data: &DataSourceConfig) -> Result<Arc<dyn InsightStore>> {
    let location = match data.source {
        vantage_core::DataSourceKind::Json => data.json_path.display(),
        vantage_core::DataSourceKind::Sqlite => data.db_path.display(),
    };
    open_store(data).with_context(|| {
        format!("Failed to open {} data source at {}", data.source, location)
    })
}
