//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::PathBuf;

use clap::Parser;
use vantage_core::test_utils::{sample_insights, write_dataset};
use vantage_core::{
    AppConfig, DataSourceConfig, DataSourceKind, Database, InsightStore, JsonStore, QueryParams,
};

use crate::cli::{Cli, Commands, QueryArgs, SourceArgs};
use crate::commands::{self, truncate};

fn setup_test_store() -> JsonStore {
    JsonStore::from_records(sample_insights())
}

// ========== Import Command Tests ==========

#[test]
fn test_cmd_import_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_dataset(dir.path(), &sample_insights());
    let db_path = dir.path().join("nested").join("vantage.db");

    let stats = commands::cmd_import(&file, &db_path, false).unwrap();
    assert_eq!(stats.inserted, 7);
    assert_eq!(stats.total, 7);

    let db = Database::open_existing(&db_path).unwrap();
    assert_eq!(db.count().unwrap(), 7);
}

#[test]
fn test_cmd_import_replaces_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vantage.db");

    let file = write_dataset(dir.path(), &sample_insights());
    commands::cmd_import(&file, &db_path, false).unwrap();

    let file = write_dataset(dir.path(), &sample_insights()[..2]);
    let stats = commands::cmd_import(&file, &db_path, false).unwrap();
    assert_eq!(stats.total, 2);
}

#[test]
fn test_cmd_import_keep_skips_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vantage.db");

    let file = write_dataset(dir.path(), &sample_insights()[..3]);
    commands::cmd_import(&file, &db_path, false).unwrap();

    let file = write_dataset(dir.path(), &sample_insights());
    let stats = commands::cmd_import(&file, &db_path, true).unwrap();
    assert_eq!(stats.inserted, 4);
    assert_eq!(stats.skipped, 3);
    assert_eq!(stats.total, 7);
}

#[test]
fn test_cmd_import_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "{ not an array").unwrap();

    let result = commands::cmd_import(&file, &dir.path().join("vantage.db"), false);
    assert!(result.is_err());
}

// ========== Query Command Tests ==========

#[test]
fn test_cmd_query() {
    let store = setup_test_store();
    let params = QueryArgs {
        topic: Some("oil".to_string()),
        sort_by: Some("intensity".to_string()),
        ..Default::default()
    }
    .into_params();

    assert!(commands::cmd_query(&store, params.clone(), false).is_ok());
    assert!(commands::cmd_query(&store, params, true).is_ok());
}

#[test]
fn test_cmd_query_no_matches() {
    let store = setup_test_store();
    let params = QueryParams {
        country: Some("Atlantis".to_string()),
        ..Default::default()
    };
    assert!(commands::cmd_query(&store, params, false).is_ok());
}

#[test]
fn test_cmd_query_invalid_sort() {
    let store = setup_test_store();
    let params = QueryParams {
        sort_by: Some("colour".to_string()),
        ..Default::default()
    };
    assert!(commands::cmd_query(&store, params, false).is_err());
}

#[test]
fn test_query_args_into_params() {
    let params = QueryArgs {
        insight_source: Some("EIA".to_string()),
        page: Some(2),
        limit: Some(10),
        ..Default::default()
    }
    .into_params();

    assert_eq!(params.source.as_deref(), Some("EIA"));
    assert_eq!(params.page.as_deref(), Some("2"));

    let query = params.into_query().unwrap();
    assert_eq!(query.page, 2);
    assert_eq!(query.limit, 10);
    assert_eq!(query.offset(), 10);
}

#[test]
fn test_cmd_show() {
    let store = setup_test_store();
    assert!(commands::cmd_show(&store, "5d8d1a1b", false).is_ok());
    assert!(commands::cmd_show(&store, "5d8d1a1b", true).is_ok());
}

#[test]
fn test_cmd_show_not_found() {
    let store = setup_test_store();
    let err = commands::cmd_show(&store, "missing", false).unwrap_err();
    assert!(err.to_string().contains("Insight not found"));
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_filters() {
    let store = setup_test_store();
    assert!(commands::cmd_filters(&store, false).is_ok());
    assert!(commands::cmd_filters(&store, true).is_ok());
}

#[test]
fn test_cmd_stats() {
    let store = setup_test_store();
    assert!(commands::cmd_stats(&store, false).is_ok());
    assert!(commands::cmd_stats(&store, true).is_ok());
}

#[test]
fn test_cmd_stats_empty_store() {
    let store = JsonStore::from_records(vec![]);
    assert!(commands::cmd_stats(&store, false).is_ok());
    assert!(commands::cmd_filters(&store, false).is_ok());
}

#[test]
fn test_reports_against_sqlite_store() {
    let db = Database::in_memory().unwrap();
    db.import_insights(&sample_insights(), true).unwrap();

    assert!(commands::cmd_stats(&db, false).is_ok());
    assert!(commands::cmd_filters(&db, false).is_ok());
    assert!(commands::cmd_show(&db, "5d8d1a20", false).is_ok());
}

// ========== Status & Config Tests ==========

#[test]
fn test_cmd_status_with_missing_source() {
    let config = AppConfig {
        data: DataSourceConfig {
            source: DataSourceKind::Sqlite,
            db_path: PathBuf::from("/nonexistent/vantage.db"),
            ..Default::default()
        },
        ..Default::default()
    };
    // An unavailable source is reported, not an error
    assert!(commands::cmd_status(&config).is_ok());
}

#[test]
fn test_apply_source_args() {
    let mut data = DataSourceConfig::default();
    let args = SourceArgs {
        source: Some("sqlite".to_string()),
        db: Some(PathBuf::from("/tmp/insights.db")),
        reload: true,
        ..Default::default()
    };
    commands::apply_source_args(&args, &mut data).unwrap();

    assert_eq!(data.source, DataSourceKind::Sqlite);
    assert_eq!(data.db_path, PathBuf::from("/tmp/insights.db"));
    assert!(data.reload);
    // Untouched flags keep their configured values
    assert_eq!(data.json_path, DataSourceConfig::default().json_path);
}

#[test]
fn test_apply_source_args_rejects_unknown_source() {
    let mut data = DataSourceConfig::default();
    let args = SourceArgs {
        source: Some("mongo".to_string()),
        ..Default::default()
    };
    assert!(commands::apply_source_args(&args, &mut data).is_err());
}

#[test]
fn test_open_source_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_dataset(dir.path(), &sample_insights());
    let data = DataSourceConfig {
        json_path: path,
        ..Default::default()
    };

    let store = commands::open_source(&data).unwrap();
    assert_eq!(store.kind(), DataSourceKind::Json);
    assert_eq!(store.count().unwrap(), 7);
}

#[test]
fn test_open_source_missing_database() {
    let data = DataSourceConfig {
        source: DataSourceKind::Sqlite,
        db_path: PathBuf::from("/nonexistent/vantage.db"),
        ..Default::default()
    };
    let err = commands::open_source(&data).err().unwrap();
    assert!(format!("{:#}", err).contains("vantage import"));
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_query_command() {
    let cli = Cli::try_parse_from([
        "vantage",
        "query",
        "--topic",
        "oil",
        "--insight-source",
        "EIA",
        "--sort-by",
        "title",
        "--limit",
        "5",
        "--source",
        "sqlite",
        "--json",
    ])
    .unwrap();

    match cli.command {
        Commands::Query {
            query,
            source,
            json,
        } => {
            assert_eq!(query.topic.as_deref(), Some("oil"));
            assert_eq!(query.insight_source.as_deref(), Some("EIA"));
            assert_eq!(query.limit, Some(5));
            assert_eq!(source.source.as_deref(), Some("sqlite"));
            assert!(json);
        }
        _ => panic!("expected query command"),
    }
}

#[test]
fn test_parse_serve_command() {
    let cli = Cli::try_parse_from([
        "vantage", "serve", "--port", "8080", "--reload", "--verbose",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Serve { port, source, .. } => {
            assert_eq!(port, Some(8080));
            assert!(source.reload);
        }
        _ => panic!("expected serve command"),
    }
}

#[test]
fn test_parse_rejects_negative_page() {
    assert!(Cli::try_parse_from(["vantage", "query", "--page", "-1"]).is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is too long", 10), "this is...");
    // Multi-byte characters are not split
    assert_eq!(truncate("Côte d'Ivoire exports", 8), "Côte ...");
}

#[test]
fn test_score() {
    assert_eq!(commands::score(Some(6.0)), "6");
    assert_eq!(commands::score(Some(2.5)), "2.5");
    assert_eq!(commands::score(None), "-");
}
