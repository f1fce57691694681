//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config loading, opening the data source)
//! - `import` - Load a JSON dataset into the SQLite store
//! - `query` - Query and show insight records
//! - `reports` - Filter options and statistics
//! - `serve` - Web server command
//! - `status` - Configuration and data source status

pub mod core;
pub mod import;
pub mod query;
pub mod reports;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use self::core::*;
pub use import::*;
pub use query::*;
pub use reports::*;
pub use serve::*;
pub use status::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an optional score for table output
pub fn score(value: Option<f64>) -> String {
    value.map(|v| format!("{}", v)).unwrap_or_else(|| "-".to_string())
}
