//! Query Engine: filter, search, sort and paginate an in-memory dataset
//!
//! The SQLite store pushes the same semantics down into SQL (see
//! `db::insight_filter`); both must agree on totals and ordering.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::models::{
    fold_case, Insight, InsightQuery, QueryResult, SortField, SortKind, SortOrder,
};

/// Run a query against a dataset
///
/// `total` counts every match before pagination; `items` is the requested
/// page of the sorted matches. Pages past the end are empty.
pub fn query(dataset: &[Insight], query: &InsightQuery) -> QueryResult {
    let matches = filter_and_sort(dataset, query);
    let total = matches.len();

    let items = matches
        .into_iter()
        .skip(query.offset())
        .take(query.limit as usize)
        .cloned()
        .collect();

    QueryResult { items, total }
}

/// Count the records matching a query's filters and search term
pub fn count(dataset: &[Insight], query: &InsightQuery) -> usize {
    let needle = search_needle(query);
    dataset
        .iter()
        .filter(|i| query.matches(i, needle.as_deref()))
        .count()
}

/// Every match of a query, in sort order, without pagination
pub fn filter_and_sort<'a>(dataset: &'a [Insight], query: &InsightQuery) -> Vec<&'a Insight> {
    let needle = search_needle(query);

    let mut keyed: Vec<(SortKey, &Insight)> = dataset
        .iter()
        .filter(|i| query.matches(i, needle.as_deref()))
        .map(|i| (SortKey::of(i, query.sort_by), i))
        .collect();

    // sort_by is stable, so ties keep dataset order in both directions
    keyed.sort_by(|(a, _), (b, _)| match query.sort_order {
        SortOrder::Asc => a.compare(b),
        SortOrder::Desc => b.compare(a),
    });

    keyed.into_iter().map(|(_, i)| i).collect()
}

fn search_needle(query: &InsightQuery) -> Option<String> {
    query.search.as_deref().map(fold_case)
}

/// Precomputed comparison key for one record
#[derive(Debug)]
enum SortKey {
    Text(String),
    Number(Option<f64>),
    Timestamp(Option<NaiveDateTime>),
}

impl SortKey {
    fn of(insight: &Insight, field: SortField) -> Self {
        match field.kind() {
            SortKind::Text => Self::Text(fold_case(field.text(insight))),
            SortKind::Number => Self::Number(field.number(insight)),
            SortKind::Timestamp => Self::Timestamp(match field {
                SortField::Published => insight.published_at(),
                _ => insight.added_at(),
            }),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => match (a, b) {
                (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                (a, b) => a.is_some().cmp(&b.is_some()),
            },
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            // Keys of one query always share a kind
            _ => Ordering::Equal,
        }
    }
}
