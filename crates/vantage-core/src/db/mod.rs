//! SQLite insight store with connection pooling and migrations
//!
//! This module is organized by concern:
//! - `insight_filter` - WHERE/ORDER BY builder shared by page and count queries
//! - `insights` - record import, lookup and paginated queries
//! - `stats` - statistics, group breakdowns and filter options

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Row};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{fold_case, Insight};

mod insight_filter;
mod insights;
mod stats;

pub use insight_filter::{FilterResult, InsightFilter};
pub use insights::ImportStats;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// SQL function applying [`fold_case`], registered on every pooled connection
pub(crate) const FOLD_CASE_FN: &str = "fold_case";

fn register_functions(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold_case(&t)))
        },
    )
}

/// Convert a SQLite `COUNT(*)` into a record count
pub(crate) fn row_count(n: i64) -> Result<usize> {
    usize::try_from(n).map_err(|_| Error::Internal(format!("Invalid row count: {}", n)))
}

/// Column list matching [`row_to_insight`]
pub(crate) const INSIGHT_COLUMNS: &str = "id, end_year, intensity, sector, topic, insight, url, \
     region, start_year, impact, added, published, country, relevance, pestle, source, title, \
     likelihood";

/// Map a row selected with [`INSIGHT_COLUMNS`]
pub(crate) fn row_to_insight(row: &Row) -> rusqlite::Result<Insight> {
    Ok(Insight {
        id: row.get(0)?,
        end_year: row.get(1)?,
        intensity: row.get(2)?,
        sector: row.get(3)?,
        topic: row.get(4)?,
        insight: row.get(5)?,
        url: row.get(6)?,
        region: row.get(7)?,
        start_year: row.get(8)?,
        impact: row.get(9)?,
        added: row.get(10)?,
        published: row.get(11)?,
        country: row.get(12)?,
        relevance: row.get(13)?,
        pestle: row.get(14)?,
        source: row.get(15)?,
        title: row.get(16)?,
        likelihood: row.get(17)?,
    })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (creating if needed) a database and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(register_functions);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Open a database that `vantage import` has already populated
    ///
    /// Serving from a path that does not exist would silently create an
    /// empty store, so that case is reported as unavailable instead.
    pub fn open_existing(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DataSourceUnavailable(format!(
                "Database not found at {} (run `vantage import` first)",
                path.display()
            )));
        }
        let path_str = path.to_str().ok_or_else(|| {
            Error::DataSourceUnavailable(format!("Database path is not UTF-8: {}", path.display()))
        })?;
        Self::new(path_str)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a scratch database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "vantage_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().into_owned();

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the importer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Insight records; seq preserves dataset order for stable sorting
            CREATE TABLE IF NOT EXISTS insights (
                seq INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                end_year TEXT NOT NULL DEFAULT '',
                intensity REAL,
                sector TEXT NOT NULL DEFAULT '',
                topic TEXT NOT NULL DEFAULT '',
                insight TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL DEFAULT '',
                region TEXT NOT NULL DEFAULT '',
                start_year TEXT NOT NULL DEFAULT '',
                impact TEXT NOT NULL DEFAULT '',
                added TEXT NOT NULL DEFAULT '',
                published TEXT NOT NULL DEFAULT '',
                country TEXT NOT NULL DEFAULT '',
                relevance REAL,
                pestle TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL DEFAULT '',
                likelihood REAL,
                added_ts TEXT,              -- parsed `added`, "YYYY-MM-DD HH:MM:SS"
                published_ts TEXT,          -- parsed `published`
                imported_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Filterable dimensions
            CREATE INDEX IF NOT EXISTS idx_insights_end_year ON insights(end_year);
            CREATE INDEX IF NOT EXISTS idx_insights_topic ON insights(topic);
            CREATE INDEX IF NOT EXISTS idx_insights_sector ON insights(sector);
            CREATE INDEX IF NOT EXISTS idx_insights_region ON insights(region);
            CREATE INDEX IF NOT EXISTS idx_insights_pestle ON insights(pestle);
            CREATE INDEX IF NOT EXISTS idx_insights_source ON insights(source);
            CREATE INDEX IF NOT EXISTS idx_insights_country ON insights(country);
            CREATE INDEX IF NOT EXISTS idx_insights_added_ts ON insights(added_ts);
            "#,
        )?;

        info!(path = %self.db_path, "Database ready");
        Ok(())
    }
}
