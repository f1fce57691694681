//! Domain models for Vantage

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of records per page
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Maximum number of records per page
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Filter value meaning "no constraint on this field"
pub const ALL_SENTINEL: &str = "all";

/// Timestamp format used by the dataset's `added` and `published` fields,
/// e.g. "January, 20 2017 03:51:25"
const DATASET_TIMESTAMP_FORMAT: &str = "%B, %d %Y %H:%M:%S";

/// One row of the analytics dataset
///
/// Empty strings mean "unset". Scores are optional because the source data
/// leaves them blank for some records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "_id")]
    pub id: String,
    pub end_year: String,
    pub intensity: Option<f64>,
    pub sector: String,
    pub topic: String,
    pub insight: String,
    pub url: String,
    pub region: String,
    pub start_year: String,
    pub impact: String,
    pub added: String,
    pub published: String,
    pub country: String,
    pub relevance: Option<f64>,
    pub pestle: String,
    pub source: String,
    pub title: String,
    pub likelihood: Option<f64>,
}

impl Insight {
    /// Value of a categorical dimension
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::EndYear => &self.end_year,
            CategoricalField::Topic => &self.topic,
            CategoricalField::Sector => &self.sector,
            CategoricalField::Region => &self.region,
            CategoricalField::Pestle => &self.pestle,
            CategoricalField::Source => &self.source,
            CategoricalField::Country => &self.country,
        }
    }

    /// Free-text fields covered by search
    pub fn searchable_text(&self) -> [&str; 4] {
        [&self.title, &self.insight, &self.topic, &self.sector]
    }

    /// Parsed `added` timestamp, if the field holds one
    pub fn added_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.added)
    }

    /// Parsed `published` timestamp, if the field holds one
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.published)
    }
}

/// Parse a dataset timestamp ("January, 20 2017 03:51:25"), falling back to ISO 8601
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, DATASET_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Case folding shared by search and text sorting in every store
///
/// Full Unicode lowercasing, so "ÉNERGIE" and "énergie" compare equal.
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Categorical dimensions that support exact-match filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    EndYear,
    Topic,
    Sector,
    Region,
    Pestle,
    Source,
    Country,
}

impl CategoricalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndYear => "end_year",
            Self::Topic => "topic",
            Self::Sector => "sector",
            Self::Region => "region",
            Self::Pestle => "pestle",
            Self::Source => "source",
            Self::Country => "country",
        }
    }

    /// Key used for this field in the filter-options payload
    pub fn plural(&self) -> &'static str {
        match self {
            Self::EndYear => "end_years",
            Self::Topic => "topics",
            Self::Sector => "sectors",
            Self::Region => "regions",
            Self::Pestle => "pestles",
            Self::Source => "sources",
            Self::Country => "countries",
        }
    }

    pub fn all() -> &'static [CategoricalField] {
        &[
            Self::EndYear,
            Self::Topic,
            Self::Sector,
            Self::Region,
            Self::Pestle,
            Self::Source,
            Self::Country,
        ]
    }
}

impl std::str::FromStr for CategoricalField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "end_year" | "endyear" => Ok(Self::EndYear),
            "topic" => Ok(Self::Topic),
            "sector" => Ok(Self::Sector),
            "region" => Ok(Self::Region),
            "pestle" => Ok(Self::Pestle),
            "source" => Ok(Self::Source),
            "country" => Ok(Self::Country),
            _ => Err(format!("Unknown categorical field: {}", s)),
        }
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How values of a sort field compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    /// Case-insensitive string comparison (see [`fold_case`])
    Text,
    /// Numeric comparison, missing values first
    Number,
    /// Chronological comparison of parsed timestamps, unparsable values first
    Timestamp,
}

/// Fields a result set can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Added,
    Published,
    EndYear,
    StartYear,
    Intensity,
    Likelihood,
    Relevance,
    Topic,
    Sector,
    Region,
    Pestle,
    Source,
    Country,
    Title,
    Impact,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Published => "published",
            Self::EndYear => "end_year",
            Self::StartYear => "start_year",
            Self::Intensity => "intensity",
            Self::Likelihood => "likelihood",
            Self::Relevance => "relevance",
            Self::Topic => "topic",
            Self::Sector => "sector",
            Self::Region => "region",
            Self::Pestle => "pestle",
            Self::Source => "source",
            Self::Country => "country",
            Self::Title => "title",
            Self::Impact => "impact",
        }
    }

    pub fn kind(&self) -> SortKind {
        match self {
            Self::Added | Self::Published => SortKind::Timestamp,
            Self::Intensity | Self::Likelihood | Self::Relevance => SortKind::Number,
            _ => SortKind::Text,
        }
    }

    /// Text value of a field sorted as text
    pub(crate) fn text<'a>(&self, insight: &'a Insight) -> &'a str {
        match self {
            Self::EndYear => &insight.end_year,
            Self::StartYear => &insight.start_year,
            Self::Topic => &insight.topic,
            Self::Sector => &insight.sector,
            Self::Region => &insight.region,
            Self::Pestle => &insight.pestle,
            Self::Source => &insight.source,
            Self::Country => &insight.country,
            Self::Title => &insight.title,
            Self::Impact => &insight.impact,
            _ => "",
        }
    }

    /// Numeric value of a score field
    pub(crate) fn number(&self, insight: &Insight) -> Option<f64> {
        match self {
            Self::Intensity => insight.intensity,
            Self::Likelihood => insight.likelihood,
            Self::Relevance => insight.relevance,
            _ => None,
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "published" => Ok(Self::Published),
            "end_year" | "endyear" => Ok(Self::EndYear),
            "start_year" | "startyear" => Ok(Self::StartYear),
            "intensity" => Ok(Self::Intensity),
            "likelihood" => Ok(Self::Likelihood),
            "relevance" => Ok(Self::Relevance),
            "topic" => Ok(Self::Topic),
            "sector" => Ok(Self::Sector),
            "region" => Ok(Self::Region),
            "pestle" => Ok(Self::Pestle),
            "source" => Ok(Self::Source),
            "country" => Ok(Self::Country),
            "title" => Ok(Self::Title),
            "impact" => Ok(Self::Impact),
            _ => Err(format!("Unknown sort field: {}", s)),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw, unvalidated query parameters as they arrive from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub end_year: Option<String>,
    pub topic: Option<String>,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub pestle: Option<String>,
    pub source: Option<String>,
    pub country: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

impl QueryParams {
    fn filter_value(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::EndYear => self.end_year.as_deref(),
            CategoricalField::Topic => self.topic.as_deref(),
            CategoricalField::Sector => self.sector.as_deref(),
            CategoricalField::Region => self.region.as_deref(),
            CategoricalField::Pestle => self.pestle.as_deref(),
            CategoricalField::Source => self.source.as_deref(),
            CategoricalField::Country => self.country.as_deref(),
        }
    }

    /// Validate into an executable query
    ///
    /// Malformed pagination or sort input is rejected instead of silently
    /// falling back to defaults.
    pub fn into_query(self) -> Result<InsightQuery> {
        let page = parse_positive("page", self.page.as_deref(), 1)?;
        let limit = parse_positive("limit", self.limit.as_deref(), DEFAULT_PAGE_LIMIT)?;

        let sort_by = match non_blank(self.sort_by.as_deref()) {
            Some(s) => s.parse::<SortField>().map_err(Error::InvalidParameter)?,
            None => SortField::default(),
        };
        let sort_order = match non_blank(self.sort_order.as_deref()) {
            Some(s) => s.parse::<SortOrder>().map_err(Error::InvalidParameter)?,
            None => SortOrder::default(),
        };

        let mut query = InsightQuery::new()
            .search(self.search.as_deref())
            .page(page)
            .limit(limit)
            .sort(sort_by, sort_order);
        for &field in CategoricalField::all() {
            query = query.filter(field, self.filter_value(field));
        }

        Ok(query)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> Result<u32> {
    match non_blank(raw) {
        None => Ok(default),
        Some(s) => match s.parse::<u32>() {
            Ok(0) => Err(Error::InvalidParameter(format!("{} must be at least 1", name))),
            Ok(value) => Ok(value),
            Err(_) => Err(Error::InvalidParameter(format!(
                "{} must be a positive integer, got '{}'",
                name, s
            ))),
        },
    }
}

/// A validated filter/sort/pagination request
///
/// Built either from [`QueryParams`] or directly through the builder methods.
/// Filter values equal to `"all"` or empty are dropped on the way in, so every
/// stored filter is an active constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightQuery {
    pub filters: Vec<(CategoricalField, String)>,
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for InsightQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            search: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl InsightQuery {
    /// Create a query matching everything, first page, default sort
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match filter; `None`, empty and `"all"` are ignored
    pub fn filter(mut self, field: CategoricalField, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty() && *v != ALL_SENTINEL) {
            self.filters.retain(|(f, _)| *f != field);
            self.filters.push((field, v.to_string()));
        }
        self
    }

    /// Set the search term (trimmed; blank clears it)
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search = non_blank(term).map(str::to_string);
        self
    }

    /// Set the 1-indexed page number (values below 1 become 1)
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_LIMIT`
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    /// Zero-based index of the first record on the requested page
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    /// Whether a record passes every filter and the search term
    ///
    /// `needle` is the search term already passed through [`fold_case`].
    pub(crate) fn matches(&self, insight: &Insight, needle: Option<&str>) -> bool {
        let filters_pass = self
            .filters
            .iter()
            .all(|(field, value)| insight.categorical(*field) == value);
        if !filters_pass {
            return false;
        }
        match needle {
            Some(needle) => insight
                .searchable_text()
                .iter()
                .any(|text| fold_case(text).contains(needle)),
            None => true,
        }
    }
}

/// Filtered, sorted page of records plus the pre-pagination match count
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub items: Vec<Insight>,
    pub total: usize,
}

impl QueryResult {
    pub fn pagination(&self, query: &InsightQuery) -> Pagination {
        Pagination::new(self.total, query.page, query.limit)
    }
}

/// Pagination metadata echoed with a result page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: u32,
    pub total_pages: usize,
    pub limit: u32,
}

impl Pagination {
    pub fn new(total: usize, page: u32, limit: u32) -> Self {
        let limit_usize = limit.max(1) as usize;
        Self {
            total,
            page,
            total_pages: total.div_ceil(limit_usize),
            limit,
        }
    }
}

/// Distinct non-empty values of every categorical field, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub end_years: Vec<String>,
    pub topics: Vec<String>,
    pub sectors: Vec<String>,
    pub regions: Vec<String>,
    pub pestles: Vec<String>,
    pub sources: Vec<String>,
    pub countries: Vec<String>,
}

impl FilterOptions {
    pub fn values(&self, field: CategoricalField) -> &[String] {
        match field {
            CategoricalField::EndYear => &self.end_years,
            CategoricalField::Topic => &self.topics,
            CategoricalField::Sector => &self.sectors,
            CategoricalField::Region => &self.regions,
            CategoricalField::Pestle => &self.pestles,
            CategoricalField::Source => &self.sources,
            CategoricalField::Country => &self.countries,
        }
    }

    pub fn set(&mut self, field: CategoricalField, values: Vec<String>) {
        let slot = match field {
            CategoricalField::EndYear => &mut self.end_years,
            CategoricalField::Topic => &mut self.topics,
            CategoricalField::Sector => &mut self.sectors,
            CategoricalField::Region => &mut self.regions,
            CategoricalField::Pestle => &mut self.pestles,
            CategoricalField::Source => &mut self.sources,
            CategoricalField::Country => &mut self.countries,
        };
        *slot = values;
    }
}

/// Number of records sharing one value of a categorical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub value: String,
    pub count: u64,
}

/// Dataset-wide statistics over the scored fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStats {
    pub total_records: u64,
    pub avg_intensity: f64,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
    pub max_intensity: f64,
    pub min_intensity: f64,
}

/// Dashboard statistics: basic figures plus group breakdowns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightStats {
    pub basic: BasicStats,
    pub topics: Vec<GroupCount>,
    pub sectors: Vec<GroupCount>,
    pub regions: Vec<GroupCount>,
    pub pestles: Vec<GroupCount>,
    pub countries: Vec<GroupCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        let mut p = QueryParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "topic" => p.topic = v,
                "country" => p.country = v,
                "search" => p.search = v,
                "limit" => p.limit = v,
                "page" => p.page = v,
                "sortBy" => p.sort_by = v,
                "sortOrder" => p.sort_order = v,
                _ => panic!("unexpected key {}", k),
            }
        }
        p
    }

    #[test]
    fn test_defaults() {
        let q = QueryParams::default().into_query().unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(q.sort_by, SortField::Added);
        assert_eq!(q.sort_order, SortOrder::Desc);
        assert!(q.filters.is_empty());
        assert!(q.search.is_none());
    }

    #[test]
    fn test_all_sentinel_and_empty_are_dropped() {
        let q = params(&[("topic", "all"), ("country", "")])
            .into_query()
            .unwrap();
        assert!(q.filters.is_empty());

        let q = params(&[("topic", "oil")]).into_query().unwrap();
        assert_eq!(q.filters, vec![(CategoricalField::Topic, "oil".to_string())]);
    }

    #[test]
    fn test_non_numeric_page_rejected() {
        let err = params(&[("page", "two")]).into_query().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = params(&[("limit", "-5")]).into_query().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = params(&[("limit", "0")]).into_query().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_limit_is_capped() {
        let q = params(&[("limit", "50000")]).into_query().unwrap();
        assert_eq!(q.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_unknown_sort_rejected() {
        let err = params(&[("sortBy", "colour")]).into_query().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = params(&[("sortOrder", "sideways")]).into_query().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let q = params(&[("sortBy", "intensity"), ("sortOrder", "ASC")])
            .into_query()
            .unwrap();
        assert_eq!(q.sort_by, SortField::Intensity);
        assert_eq!(q.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let q = params(&[("search", "   ")]).into_query().unwrap();
        assert!(q.search.is_none());

        let q = params(&[("search", "  oil ")]).into_query().unwrap();
        assert_eq!(q.search.as_deref(), Some("oil"));
    }

    #[test]
    fn test_pagination_total_pages() {
        assert_eq!(Pagination::new(5, 2, 2).total_pages, 3);
        assert_eq!(Pagination::new(4, 1, 2).total_pages, 2);
        assert_eq!(Pagination::new(0, 1, 50).total_pages, 0);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("January, 20 2017 03:51:25").unwrap();
        assert_eq!(ts.to_string(), "2017-01-20 03:51:25");
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("sometime last year").is_none());
    }

    #[test]
    fn test_search_folds_unicode_case() {
        let record = Insight {
            title: "ÉNERGIE solaire".to_string(),
            ..Default::default()
        };
        let query = InsightQuery::new().search(Some("Énergie"));
        let needle = query.search.as_deref().map(fold_case);
        assert!(query.matches(&record, needle.as_deref()));
        assert_eq!(fold_case("Étude"), "étude");
    }

    #[test]
    fn test_field_round_trip() {
        for field in CategoricalField::all() {
            assert_eq!(field.as_str().parse::<CategoricalField>().unwrap(), *field);
        }
        assert_eq!("end_year".parse::<SortField>().unwrap(), SortField::EndYear);
    }
}
