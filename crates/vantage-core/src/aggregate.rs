//! Aggregation Engine: dataset statistics, group breakdowns and filter options

use std::collections::{BTreeSet, HashMap};

use crate::models::{BasicStats, CategoricalField, FilterOptions, GroupCount, Insight, InsightStats};

/// Cap for "top items" breakdowns (topics, sectors, pestles)
pub const TOP_ITEMS_LIMIT: usize = 10;

/// Cap for geographic breakdowns (regions, countries)
pub const GEO_BREAKDOWN_LIMIT: usize = 15;

/// Count records per non-empty value of `field`
///
/// Sorted by count descending; equal counts keep the order in which values
/// were first seen. Not truncated.
pub fn group_counts(dataset: &[Insight], field: CategoricalField) -> Vec<GroupCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupCount> = Vec::new();

    for insight in dataset {
        let value = insight.categorical(field);
        if value.is_empty() {
            continue;
        }
        match index.get(value) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(value, groups.len());
                groups.push(GroupCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// Top 10 values of a field by record count
pub fn top_items(dataset: &[Insight], field: CategoricalField) -> Vec<GroupCount> {
    let mut groups = group_counts(dataset, field);
    groups.truncate(TOP_ITEMS_LIMIT);
    groups
}

/// Top 15 values of a geographic field by record count
pub fn geo_breakdown(dataset: &[Insight], field: CategoricalField) -> Vec<GroupCount> {
    let mut groups = group_counts(dataset, field);
    groups.truncate(GEO_BREAKDOWN_LIMIT);
    groups
}

/// Count, means and intensity extremes across the whole dataset
///
/// Missing scores count as 0 in sums, averages and extremes. An empty dataset
/// yields all zeros.
pub fn basic_stats(dataset: &[Insight]) -> BasicStats {
    if dataset.is_empty() {
        return BasicStats::default();
    }

    let n = dataset.len() as f64;
    let intensity = |i: &Insight| i.intensity.unwrap_or(0.0);

    let sum_intensity: f64 = dataset.iter().map(intensity).sum();
    let sum_likelihood: f64 = dataset.iter().map(|i| i.likelihood.unwrap_or(0.0)).sum();
    let sum_relevance: f64 = dataset.iter().map(|i| i.relevance.unwrap_or(0.0)).sum();

    let max_intensity = dataset.iter().map(intensity).fold(f64::MIN, f64::max);
    let min_intensity = dataset.iter().map(intensity).fold(f64::MAX, f64::min);

    BasicStats {
        total_records: dataset.len() as u64,
        avg_intensity: sum_intensity / n,
        avg_likelihood: sum_likelihood / n,
        avg_relevance: sum_relevance / n,
        max_intensity,
        min_intensity,
    }
}

/// Sorted distinct non-empty values of one field
pub fn distinct_values(dataset: &[Insight], field: CategoricalField) -> Vec<String> {
    dataset
        .iter()
        .map(|i| i.categorical(field))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Every value each categorical filter can take
pub fn filter_options(dataset: &[Insight]) -> FilterOptions {
    let mut options = FilterOptions::default();
    for &field in CategoricalField::all() {
        options.set(field, distinct_values(dataset, field));
    }
    options
}

/// Full dashboard statistics payload
pub fn summarize(dataset: &[Insight]) -> InsightStats {
    InsightStats {
        basic: basic_stats(dataset),
        topics: top_items(dataset, CategoricalField::Topic),
        sectors: top_items(dataset, CategoricalField::Sector),
        regions: geo_breakdown(dataset, CategoricalField::Region),
        pestles: top_items(dataset, CategoricalField::Pestle),
        countries: geo_breakdown(dataset, CategoricalField::Country),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insight, sample_insights};

    #[test]
    fn test_group_breakdown_example() {
        let data = vec![
            insight("1").topic("AI").build(),
            insight("2").topic("AI").build(),
            insight("3").topic("ML").build(),
        ];
        let groups = group_counts(&data, CategoricalField::Topic);
        assert_eq!(
            serde_json::to_value(&groups).unwrap(),
            serde_json::json!([{"_id": "AI", "count": 2}, {"_id": "ML", "count": 1}])
        );
    }

    #[test]
    fn test_group_ties_keep_first_seen_order() {
        let data = vec![
            insight("1").sector("Energy").build(),
            insight("2").sector("Retail").build(),
            insight("3").sector("Retail").build(),
            insight("4").sector("Energy").build(),
            insight("5").sector("Aerospace").build(),
        ];
        let values: Vec<String> = group_counts(&data, CategoricalField::Sector)
            .into_iter()
            .map(|g| g.value)
            .collect();
        assert_eq!(values, vec!["Energy", "Retail", "Aerospace"]);
    }

    #[test]
    fn test_group_counts_sum_to_non_empty() {
        let data = sample_insights();
        for &field in CategoricalField::all() {
            let groups = group_counts(&data, field);
            let total: u64 = groups.iter().map(|g| g.count).sum();
            let non_empty = data
                .iter()
                .filter(|i| !i.categorical(field).is_empty())
                .count() as u64;
            assert_eq!(total, non_empty, "field {}", field);
            assert!(groups.windows(2).all(|w| w[0].count >= w[1].count));
        }
    }

    #[test]
    fn test_breakdown_caps() {
        let data: Vec<Insight> = (0..20)
            .map(|n| {
                insight(&n.to_string())
                    .topic(&format!("topic-{}", n))
                    .country(&format!("country-{}", n))
                    .build()
            })
            .collect();
        assert_eq!(top_items(&data, CategoricalField::Topic).len(), TOP_ITEMS_LIMIT);
        assert_eq!(
            geo_breakdown(&data, CategoricalField::Country).len(),
            GEO_BREAKDOWN_LIMIT
        );

        let stats = summarize(&data);
        assert_eq!(stats.topics.len(), 10);
        assert_eq!(stats.countries.len(), 15);
    }

    #[test]
    fn test_basic_stats_zero_fill_missing() {
        let data = vec![
            insight("1").intensity(6.0).likelihood(3.0).relevance(2.0).build(),
            insight("2").intensity(2.0).likelihood(1.0).build(),
            insight("3").build(),
        ];
        let stats = basic_stats(&data);
        assert_eq!(stats.total_records, 3);
        assert!((stats.avg_intensity - 8.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_likelihood - 4.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_relevance - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.max_intensity, 6.0);
        assert_eq!(stats.min_intensity, 0.0);
    }

    #[test]
    fn test_basic_stats_empty_dataset() {
        assert_eq!(basic_stats(&[]), BasicStats::default());
    }

    #[test]
    fn test_filter_options_sorted_distinct() {
        let data = vec![
            insight("1").region("Northern America").build(),
            insight("2").region("").build(),
            insight("3").region("Africa").build(),
            insight("4").region("Northern America").build(),
        ];
        let options = filter_options(&data);
        assert_eq!(options.regions, vec!["Africa", "Northern America"]);
        assert!(options.topics.is_empty());
    }

    #[test]
    fn test_filter_options_independent_of_order() {
        let data = sample_insights();
        let mut reversed = data.clone();
        reversed.reverse();
        assert_eq!(filter_options(&data), filter_options(&reversed));
        // Idempotent
        assert_eq!(filter_options(&data), filter_options(&data));
    }
}
