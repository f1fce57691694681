//! Import command implementation

use std::path::Path;

use anyhow::{bail, Context, Result};
use vantage_core::{load_dataset, Database, ImportStats};

/// Load a JSON dataset into the SQLite store
///
/// Replaces the stored records unless `keep` is set, then verifies the
/// stored count.
pub fn cmd_import(file: &Path, db_path: &Path, keep: bool) -> Result<ImportStats> {
    println!("📥 Importing {}...", file.display());

    let insights = load_dataset(file).context("Failed to load dataset")?;
    println!("   Parsed {} records", insights.len());

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not UTF-8: {}", db_path.display()))?;
    let db = Database::new(path_str).context("Failed to open database")?;

    let stats = db
        .import_insights(&insights, !keep)
        .context("Failed to import records")?;

    println!("   Inserted: {}", stats.inserted);
    if stats.skipped > 0 {
        println!("   Skipped (already stored): {}", stats.skipped);
    }

    // A replacing import must leave exactly the dataset behind
    if !keep && stats.total != insights.len() {
        bail!(
            "Stored record count {} does not match dataset size {}",
            stats.total,
            insights.len()
        );
    }

    println!(
        "✅ {} records stored in {}",
        stats.total,
        db_path.display()
    );
    Ok(stats)
}
