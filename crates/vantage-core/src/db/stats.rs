//! Statistics, group breakdowns and filter options in SQL
//!
//! Mirrors the in-memory Aggregation Engine: missing scores count as 0,
//! blank categorical values are excluded, group ties keep dataset order.

use rusqlite::params;

use super::Database;
use crate::aggregate::{GEO_BREAKDOWN_LIMIT, TOP_ITEMS_LIMIT};
use crate::error::Result;
use crate::models::{BasicStats, CategoricalField, FilterOptions, GroupCount, InsightStats};

impl Database {
    /// Count, means and intensity extremes across all records
    pub fn basic_stats(&self) -> Result<BasicStats> {
        let conn = self.conn()?;
        let stats = conn.query_row(
            "SELECT
                COUNT(*),
                AVG(COALESCE(intensity, 0)),
                AVG(COALESCE(likelihood, 0)),
                AVG(COALESCE(relevance, 0)),
                MAX(COALESCE(intensity, 0)),
                MIN(COALESCE(intensity, 0))
             FROM insights",
            [],
            |row| {
                // Aggregates over an empty table are NULL
                Ok(BasicStats {
                    total_records: row.get::<_, i64>(0)? as u64,
                    avg_intensity: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                    avg_likelihood: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                    avg_relevance: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                    max_intensity: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                    min_intensity: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                })
            },
        )?;
        Ok(stats)
    }

    /// Records per non-empty value of `field`, most frequent first
    ///
    /// `limit` of `None` returns every group.
    pub fn group_counts(
        &self,
        field: CategoricalField,
        limit: Option<usize>,
    ) -> Result<Vec<GroupCount>> {
        let conn = self.conn()?;
        let column = field.as_str();
        let sql = format!(
            "SELECT {column}, COUNT(*) AS n
             FROM insights
             WHERE {column} != ''
             GROUP BY {column}
             ORDER BY n DESC, MIN(seq) ASC
             LIMIT ?"
        );

        // LIMIT -1 means no limit in SQLite
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&sql)?;
        let groups = stmt
            .query_map(params![limit], |row| {
                Ok(GroupCount {
                    value: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(groups)
    }

    /// Sorted distinct non-empty values of one field
    pub fn distinct_values(&self, field: CategoricalField) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let column = field.as_str();
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {column} FROM insights WHERE {column} != '' ORDER BY {column}"
        ))?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(values)
    }

    /// Every value each categorical filter can take
    pub fn insight_filter_options(&self) -> Result<FilterOptions> {
        let mut options = FilterOptions::default();
        for &field in CategoricalField::all() {
            options.set(field, self.distinct_values(field)?);
        }
        Ok(options)
    }

    /// Full dashboard statistics payload
    pub fn insight_stats(&self) -> Result<InsightStats> {
        let top = |field| self.group_counts(field, Some(TOP_ITEMS_LIMIT));
        let geo = |field| self.group_counts(field, Some(GEO_BREAKDOWN_LIMIT));

        Ok(InsightStats {
            basic: self.basic_stats()?,
            topics: top(CategoricalField::Topic)?,
            sectors: top(CategoricalField::Sector)?,
            regions: geo(CategoricalField::Region)?,
            pestles: top(CategoricalField::Pestle)?,
            countries: geo(CategoricalField::Country)?,
        })
    }
}
