//! Data sources behind the Query and Aggregation engines
//!
//! Two interchangeable implementations of [`InsightStore`]:
//! - [`JsonStore`] - dataset file materialized in memory (optionally re-read
//!   on every call), answered by the in-memory engines
//! - [`Database`] - SQLite store that answers the same operations in SQL
//!
//! Both produce identical results for the same dataset and query.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate;
use crate::config::DataSourceConfig;
use crate::dataset::load_dataset;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{FilterOptions, Insight, InsightQuery, InsightStats, QueryResult};
use crate::query;

/// Which backing store serves the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// JSON dataset file held in memory
    #[default]
    Json,
    /// SQLite database populated by `vantage import`
    Sqlite,
}

impl DataSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::str::FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "file" | "memory" => Ok(Self::Json),
            "sqlite" | "db" | "database" => Ok(Self::Sqlite),
            _ => Err(format!("Unknown data source: {}", s)),
        }
    }
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only access to the insight dataset
///
/// Implementations hold no per-request state, so one instance is shared by
/// every request handler.
pub trait InsightStore: Send + Sync {
    /// Which kind of backing store this is
    fn kind(&self) -> DataSourceKind;

    /// Number of records in the dataset
    fn count(&self) -> Result<usize>;

    /// Filtered, sorted page plus total match count
    fn query(&self, query: &InsightQuery) -> Result<QueryResult>;

    /// Look up one record by id
    fn get(&self, id: &str) -> Result<Option<Insight>>;

    /// Look up one record by id, failing with [`Error::NotFound`] when absent
    fn require(&self, id: &str) -> Result<Insight> {
        self.get(id)?
            .ok_or_else(|| Error::NotFound("Insight not found".to_string()))
    }

    /// Distinct values of every categorical field
    fn filter_options(&self) -> Result<FilterOptions>;

    /// Basic statistics and group breakdowns
    fn summarize(&self) -> Result<InsightStats>;
}

/// Where a [`JsonStore`] gets its records from
enum Dataset {
    /// Loaded once, shared for the life of the store
    Loaded(Arc<Vec<Insight>>),
    /// Re-read from disk on every call
    Reload(PathBuf),
}

/// Dataset file materialized in memory
pub struct JsonStore {
    dataset: Dataset,
}

impl JsonStore {
    /// Load a dataset file once
    pub fn open(path: &Path) -> Result<Self> {
        let insights = load_dataset(path)?;
        Ok(Self::from_records(insights))
    }

    /// Re-read the dataset file on every call
    ///
    /// The file is validated once up front so a bad path fails at startup
    /// rather than on the first request.
    pub fn reloading(path: &Path) -> Result<Self> {
        load_dataset(path)?;
        Ok(Self {
            dataset: Dataset::Reload(path.to_path_buf()),
        })
    }

    /// Serve an already-materialized set of records
    pub fn from_records(insights: Vec<Insight>) -> Self {
        Self {
            dataset: Dataset::Loaded(Arc::new(insights)),
        }
    }

    fn records(&self) -> Result<Arc<Vec<Insight>>> {
        match &self.dataset {
            Dataset::Loaded(insights) => Ok(Arc::clone(insights)),
            Dataset::Reload(path) => Ok(Arc::new(load_dataset(path)?)),
        }
    }
}

impl InsightStore for JsonStore {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Json
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records()?.len())
    }

    fn query(&self, q: &InsightQuery) -> Result<QueryResult> {
        Ok(query::query(&self.records()?, q))
    }

    fn get(&self, id: &str) -> Result<Option<Insight>> {
        Ok(self.records()?.iter().find(|i| i.id == id).cloned())
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        Ok(aggregate::filter_options(&self.records()?))
    }

    fn summarize(&self) -> Result<InsightStats> {
        Ok(aggregate::summarize(&self.records()?))
    }
}

/// Open the store selected by configuration
pub fn open_store(config: &DataSourceConfig) -> Result<Arc<dyn InsightStore>> {
    let store: Arc<dyn InsightStore> = match config.source {
        DataSourceKind::Json if config.reload => {
            info!(path = %config.json_path.display(), "Serving JSON dataset (reload per request)");
            Arc::new(JsonStore::reloading(&config.json_path)?)
        }
        DataSourceKind::Json => {
            info!(path = %config.json_path.display(), "Serving JSON dataset");
            Arc::new(JsonStore::open(&config.json_path)?)
        }
        DataSourceKind::Sqlite => {
            info!(path = %config.db_path.display(), "Serving SQLite dataset");
            Arc::new(Database::open_existing(&config.db_path)?)
        }
    };
    Ok(store)
}
