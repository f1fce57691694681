//! Status command implementation

use std::fs;
use std::path::Path;

use anyhow::Result;
use vantage_core::{AppConfig, DataSourceKind};

use super::open_source;

pub fn cmd_status(config: &AppConfig) -> Result<()> {
    println!();
    println!("📊 Vantage Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!(
        "   Server: http://{}:{} ({})",
        config.server.host, config.server.port, config.server.environment
    );
    println!("   Data source: {}", config.data.source);
    print_file("Dataset", &config.data.json_path);
    print_file("Database", &config.data.db_path);
    if config.data.source == DataSourceKind::Json && config.data.reload {
        println!("   🔄 Reload per request: enabled");
    }

    match open_source(&config.data).and_then(|store| Ok(store.count()?)) {
        Ok(count) => {
            println!();
            println!("   ✅ Records: {}", count);
        }
        Err(e) => {
            println!();
            println!("   ❌ Data source unavailable: {:#}", e);
            if config.data.source == DataSourceKind::Sqlite {
                println!("      Run `vantage import` to create the database");
            }
        }
    }

    println!();
    Ok(())
}

fn print_file(label: &str, path: &Path) {
    match fs::metadata(path) {
        Ok(metadata) => {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   {}: {} ({:.1} KB)", label, path.display(), size_kb);
            } else {
                println!("   {}: {} ({:.1} MB)", label, path.display(), size_kb / 1024.0);
            }
        }
        Err(_) => println!("   {}: {} (missing)", label, path.display()),
    }
}
