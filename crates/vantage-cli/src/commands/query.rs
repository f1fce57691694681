//! Query and show command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use vantage_core::models::Pagination;
use vantage_core::{Insight, InsightStore, QueryParams};

use super::{score, truncate};

/// `--json` output of `vantage query`, shaped like the API response
#[derive(Serialize)]
struct QueryOutput<'a> {
    data: &'a [Insight],
    pagination: Pagination,
}

pub fn cmd_query(store: &dyn InsightStore, params: QueryParams, json: bool) -> Result<()> {
    let query = params.into_query().context("Invalid query")?;
    let result = store.query(&query).context("Query failed")?;
    let pagination = result.pagination(&query);

    if json {
        let output = QueryOutput {
            data: &result.items,
            pagination,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if result.items.is_empty() {
        println!("No insights match (page {} of {}).", pagination.page, pagination.total_pages);
        return Ok(());
    }

    println!();
    println!(
        "  {:<26} {:<16} {:<18} {:<20} {:>5} {:>5}  Title",
        "ID", "Topic", "Sector", "Country", "Int", "Lik"
    );
    println!("  {}", "─".repeat(120));
    for insight in &result.items {
        println!(
            "  {:<26} {:<16} {:<18} {:<20} {:>5} {:>5}  {}",
            truncate(&insight.id, 26),
            truncate(&insight.topic, 16),
            truncate(&insight.sector, 18),
            truncate(&insight.country, 20),
            score(insight.intensity),
            score(insight.likelihood),
            truncate(&insight.title, 50),
        );
    }
    println!();
    println!(
        "  Page {} of {} ({} matching, sorted by {} {})",
        pagination.page,
        pagination.total_pages,
        pagination.total,
        query.sort_by,
        query.sort_order
    );

    Ok(())
}

pub fn cmd_show(store: &dyn InsightStore, id: &str, json: bool) -> Result<()> {
    let insight = store
        .require(id)
        .with_context(|| format!("Insight not found: {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(());
    }

    println!();
    println!("📄 {}", insight.title);
    println!("   ─────────────────────────────────────────────────────────────");
    let rows = [
        ("ID", insight.id.as_str()),
        ("Topic", insight.topic.as_str()),
        ("Sector", insight.sector.as_str()),
        ("Region", insight.region.as_str()),
        ("Country", insight.country.as_str()),
        ("PESTLE", insight.pestle.as_str()),
        ("Source", insight.source.as_str()),
        ("Start year", insight.start_year.as_str()),
        ("End year", insight.end_year.as_str()),
        ("Impact", insight.impact.as_str()),
        ("Added", insight.added.as_str()),
        ("Published", insight.published.as_str()),
        ("URL", insight.url.as_str()),
    ];
    for (label, value) in rows {
        if !value.is_empty() {
            println!("   {:<12} {}", label, value);
        }
    }
    println!(
        "   {:<12} intensity {} · likelihood {} · relevance {}",
        "Scores",
        score(insight.intensity),
        score(insight.likelihood),
        score(insight.relevance)
    );
    if !insight.insight.is_empty() {
        println!();
        println!("   {}", insight.insight);
    }
    println!();

    Ok(())
}
