//! Insight filter builder for constructing dynamic SQL queries
//!
//! Translates an [`InsightQuery`] into WHERE/ORDER BY clauses so the page
//! query and the count query always share one predicate.

use super::FOLD_CASE_FN;
use crate::models::{fold_case, InsightQuery, SortField, SortKind, SortOrder};

/// Builder for constructing insight query filters
///
/// The lifetime `'query` ties the builder to the query it translates.
pub struct InsightFilter<'query> {
    query: &'query InsightQuery,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> InsightFilter<'query> {
    /// Create a filter builder for a query
    pub fn new(query: &'query InsightQuery) -> Self {
        Self { query }
    }

    /// Build the filter components
    pub fn build(self) -> FilterResult {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        // Exact, case-sensitive equality per categorical column
        for (field, value) in &self.query.filters {
            conditions.push(format!("{} = ?", field.as_str()));
            params.push(Box::new(value.clone()));
        }

        // Search: both sides folded with the same Unicode lowercasing
        if let Some(term) = self.query.search.as_deref() {
            let predicates: Vec<String> = ["title", "insight", "topic", "sector"]
                .iter()
                .map(|column| format!(r"{}({}) LIKE ? ESCAPE '\'", FOLD_CASE_FN, column))
                .collect();
            conditions.push(format!("({})", predicates.join(" OR ")));
            let pattern = format!("%{}%", escape_like(&fold_case(term)));
            for _ in 0..4 {
                params.push(Box::new(pattern.clone()));
            }
        }

        // Build WHERE clause
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // Build ORDER BY clause; seq keeps ties in dataset order
        let order_dir = match self.query.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let order_clause = format!(
            "ORDER BY {} {}, seq ASC",
            sort_expression(self.query.sort_by),
            order_dir
        );

        FilterResult {
            where_clause,
            order_clause,
            params,
        }
    }
}

/// SQL expression a sort field orders by
fn sort_expression(field: SortField) -> String {
    match field.kind() {
        SortKind::Timestamp => match field {
            SortField::Published => "published_ts".to_string(),
            _ => "added_ts".to_string(),
        },
        SortKind::Number => field.as_str().to_string(),
        SortKind::Text => format!("{}({})", FOLD_CASE_FN, field.as_str()),
    }
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl FilterResult {
    /// Build a COUNT query
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM insights {}", self.where_clause)
    }

    /// Build a paginated SELECT; expects LIMIT and OFFSET params appended
    pub fn build_page_query(&self, columns: &str) -> String {
        format!(
            "SELECT {} FROM insights {} {} LIMIT ? OFFSET ?",
            columns, self.where_clause, self.order_clause
        )
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Get mutable parameter vector to append pagination params
    pub fn into_params(self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
    }
}
