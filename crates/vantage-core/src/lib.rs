//! Vantage Core Library
//!
//! Shared functionality for the Vantage insights dashboard:
//! - Insight records and query/response models
//! - Dataset loading and validation
//! - Query Engine (filter, search, sort, paginate)
//! - Aggregation Engine (statistics, breakdowns, filter options)
//! - Interchangeable JSON and SQLite data sources
//! - Layered configuration

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod store;

/// Test utilities including the sample dataset
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{AppConfig, DataSourceConfig, ServerSettings};
pub use dataset::{load_dataset, parse_dataset};
pub use db::{Database, ImportStats};
pub use error::{Error, Result};
pub use models::{
    BasicStats, CategoricalField, FilterOptions, GroupCount, Insight, InsightQuery, InsightStats,
    Pagination, QueryParams, QueryResult, SortField, SortOrder,
};
pub use store::{open_store, DataSourceKind, InsightStore, JsonStore};
