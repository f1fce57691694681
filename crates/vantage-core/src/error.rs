//! Error types for Vantage

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable kind, used in API error envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::DataSourceUnavailable(_) | Self::Pool(_) => "data_source_unavailable",
            Self::Config(_) => "config",
            Self::Internal(_) | Self::Database(_) | Self::Io(_) | Self::Json(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
