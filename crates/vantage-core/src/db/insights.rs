//! Insight import, lookup and paginated queries

use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::info;

use super::{row_count, row_to_insight, Database, InsightFilter, INSIGHT_COLUMNS};
use crate::error::Result;
use crate::models::{FilterOptions, Insight, InsightQuery, InsightStats, QueryResult};
use crate::store::{DataSourceKind, InsightStore};

/// Storage format for parsed `added`/`published` timestamps
///
/// Lexicographic order of this format is chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of importing a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Records written
    pub inserted: usize,
    /// Records skipped because their id was already stored
    pub skipped: usize,
    /// Records in the database after the import
    pub total: usize,
}

impl Database {
    /// Import records in dataset order
    ///
    /// With `replace`, existing records are deleted first so the database
    /// mirrors the dataset exactly. Otherwise records whose id is already
    /// stored are skipped. Runs in one transaction.
    pub fn import_insights(&self, insights: &[Insight], replace: bool) -> Result<ImportStats> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if replace {
            let removed = tx.execute("DELETE FROM insights", [])?;
            if removed > 0 {
                info!(removed, "Cleared existing insights");
            }
        }

        let mut inserted = 0;
        let mut skipped = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO insights (
                    id, end_year, intensity, sector, topic, insight, url, region,
                    start_year, impact, added, published, country, relevance,
                    pestle, source, title, likelihood, added_ts, published_ts
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;

            for insight in insights {
                let added_ts = insight
                    .added_at()
                    .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string());
                let published_ts = insight
                    .published_at()
                    .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string());

                let changed = stmt.execute(params![
                    insight.id,
                    insight.end_year,
                    insight.intensity,
                    insight.sector,
                    insight.topic,
                    insight.insight,
                    insight.url,
                    insight.region,
                    insight.start_year,
                    insight.impact,
                    insight.added,
                    insight.published,
                    insight.country,
                    insight.relevance,
                    insight.pestle,
                    insight.source,
                    insight.title,
                    insight.likelihood,
                    added_ts,
                    published_ts,
                ])?;

                if changed > 0 {
                    inserted += 1;
                } else {
                    skipped += 1;
                }
            }
        }

        tx.commit()?;

        let total = self.count_insights()?;
        info!(inserted, skipped, total, "Imported insights");
        Ok(ImportStats {
            inserted,
            skipped,
            total,
        })
    }

    /// Number of stored records
    pub fn count_insights(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM insights", [], |row| row.get(0))?;
        row_count(count)
    }

    /// Look up one record by id
    pub fn get_insight(&self, id: &str) -> Result<Option<Insight>> {
        let conn = self.conn()?;
        let insight = conn
            .query_row(
                &format!("SELECT {} FROM insights WHERE id = ?", INSIGHT_COLUMNS),
                params![id],
                row_to_insight,
            )
            .optional()?;
        Ok(insight)
    }

    /// Filtered, sorted page plus the total number of matches
    pub fn query_insights(&self, query: &InsightQuery) -> Result<QueryResult> {
        let conn = self.conn()?;
        let filter = InsightFilter::new(query).build();

        let total: i64 = conn.query_row(
            &filter.build_count_query(),
            filter.params_refs().as_slice(),
            |row| row.get(0),
        )?;

        let sql = filter.build_page_query(INSIGHT_COLUMNS);
        let mut params = filter.into_params();
        params.push(Box::new(query.limit as i64));
        params.push(Box::new(query.offset() as i64));
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(param_refs.as_slice(), row_to_insight)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(QueryResult {
            items,
            total: row_count(total)?,
        })
    }
}

impl InsightStore for Database {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Sqlite
    }

    fn count(&self) -> Result<usize> {
        self.count_insights()
    }

    fn query(&self, query: &InsightQuery) -> Result<QueryResult> {
        self.query_insights(query)
    }

    fn get(&self, id: &str) -> Result<Option<Insight>> {
        self.get_insight(id)
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        self.insight_filter_options()
    }

    fn summarize(&self) -> Result<InsightStats> {
        self.insight_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoricalField, SortField, SortOrder};
    use crate::test_utils::{insight, sample_insights};

    fn sample_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.import_insights(&sample_insights(), true).unwrap();
        db
    }

    fn ids(result: &QueryResult) -> Vec<&str> {
        result.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_import_and_get_roundtrip() {
        let db = sample_db();
        assert_eq!(db.count_insights().unwrap(), 7);

        let stored = db.get_insight("5d8d1a1b").unwrap().unwrap();
        assert_eq!(stored, sample_insights()[0]);

        // Missing scores come back as None, not 0
        let unscored = db.get_insight("5d8d1a1f").unwrap().unwrap();
        assert_eq!(unscored.intensity, None);

        assert!(db.get_insight("nope").unwrap().is_none());
    }

    #[test]
    fn test_import_skips_existing_ids() {
        let db = sample_db();
        let stats = db.import_insights(&sample_insights(), false).unwrap();
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.skipped, 7);
        assert_eq!(stats.total, 7);
    }

    #[test]
    fn test_import_replace() {
        let db = sample_db();
        let stats = db
            .import_insights(&[insight("x").topic("oil").build()], true)
            .unwrap();
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn test_stored_timestamps() {
        let db = sample_db();
        let conn = db.conn().unwrap();
        let (added, published): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT added_ts, published_ts FROM insights WHERE id = '5d8d1a1b'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(added.as_deref(), Some("2017-01-20 03:51:25"));
        assert_eq!(published.as_deref(), Some("2017-01-09 00:00:00"));

        // Unparsable text is stored as NULL
        let bad: Option<String> = conn
            .query_row(
                "SELECT added_ts FROM insights WHERE id = '5d8d1a1f'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(bad.is_none());
    }

    #[test]
    fn test_query_filter_and_pagination() {
        let db = sample_db();
        let query = InsightQuery::new()
            .filter(CategoricalField::Topic, Some("oil"))
            .sort(SortField::Intensity, SortOrder::Desc)
            .limit(2);

        let page1 = db.query_insights(&query).unwrap();
        assert_eq!(page1.total, 3);
        assert_eq!(ids(&page1), vec!["5d8d1a1d", "5d8d1a20"]);

        let page2 = db.query_insights(&query.clone().page(2)).unwrap();
        assert_eq!(page2.total, 3);
        assert_eq!(ids(&page2), vec!["5d8d1a1c"]);

        let past_end = db.query_insights(&query.page(9)).unwrap();
        assert_eq!(past_end.total, 3);
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let db = sample_db();
        let result = db
            .query_insights(&InsightQuery::new().search(Some("CRUDE oil")))
            .unwrap();
        assert_eq!(result.total, 2);
    }

    #[test]
    fn test_query_search_wildcards_are_literal() {
        let db = sample_db();
        let result = db
            .query_insights(&InsightQuery::new().search(Some("%")))
            .unwrap();
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_default_sort_puts_unparsable_added_last() {
        let db = sample_db();
        let result = db.query_insights(&InsightQuery::new()).unwrap();
        assert_eq!(result.items.first().unwrap().id, "5d8d1a1e");
        assert_eq!(result.items.last().unwrap().id, "5d8d1a1f");
    }
}
