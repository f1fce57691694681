//! Server command implementation

use anyhow::Result;
use vantage_core::{AppConfig, DataSourceKind};
use vantage_server::ServerConfig;

use super::open_source;

pub async fn cmd_serve(config: AppConfig) -> Result<()> {
    println!("🚀 Starting Vantage web server...");
    match config.data.source {
        DataSourceKind::Json => {
            println!("   Dataset: {}", config.data.json_path.display());
            if config.data.reload {
                println!("   🔄 Reloading dataset on every request");
            }
        }
        DataSourceKind::Sqlite => println!("   Database: {}", config.data.db_path.display()),
    }
    println!(
        "   Listening: http://{}:{}",
        config.server.host, config.server.port
    );
    println!("   Environment: {}", config.server.environment);
    if let Some(dir) = &config.server.static_dir {
        println!("   Static files: {}", dir.display());
    }
    if config.server.allowed_origins.is_empty() {
        println!("   🔒 CORS: same-origin only");
    } else {
        println!(
            "   🌐 CORS origins: {}",
            config.server.allowed_origins.join(", ")
        );
    }

    let store = open_source(&config.data)?;
    let server_config = ServerConfig::from(&config.server);

    vantage_server::serve_with_config(
        store,
        &config.server.host,
        config.server.port,
        server_config,
    )
    .await
}
