//! Report command implementations (filter options, statistics)

use anyhow::{Context, Result};
use vantage_core::models::GroupCount;
use vantage_core::{CategoricalField, InsightStore};

use super::truncate;

pub fn cmd_filters(store: &dyn InsightStore, json: bool) -> Result<()> {
    let options = store.filter_options().context("Failed to load filter options")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    println!();
    println!("🔎 Filter Options");
    for &field in CategoricalField::all() {
        let values = options.values(field);
        println!();
        println!("  {} ({})", field.plural(), values.len());
        if values.is_empty() {
            println!("    (none)");
            continue;
        }
        println!("    {}", truncate(&values.join(", "), 100));
    }
    println!();

    Ok(())
}

pub fn cmd_stats(store: &dyn InsightStore, json: bool) -> Result<()> {
    let stats = store.summarize().context("Failed to compute statistics")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let basic = &stats.basic;
    println!();
    println!("📊 Insight Statistics");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Records:         {}", basic.total_records);
    println!("   Avg intensity:   {:.2}", basic.avg_intensity);
    println!("   Avg likelihood:  {:.2}", basic.avg_likelihood);
    println!("   Avg relevance:   {:.2}", basic.avg_relevance);
    println!(
        "   Intensity range: {} - {}",
        basic.min_intensity, basic.max_intensity
    );

    print_breakdown("Top topics", &stats.topics);
    print_breakdown("Top sectors", &stats.sectors);
    print_breakdown("Top PESTLE", &stats.pestles);
    print_breakdown("Regions", &stats.regions);
    print_breakdown("Countries", &stats.countries);
    println!();

    Ok(())
}

fn print_breakdown(title: &str, groups: &[GroupCount]) {
    println!();
    println!("  {}", title);
    if groups.is_empty() {
        println!("    (none)");
        return;
    }

    let max = groups.iter().map(|g| g.count).max().unwrap_or(1).max(1);
    for group in groups {
        let bar = "█".repeat(((group.count * 20) / max) as usize);
        println!(
            "    {:<28} {:>5}  {}",
            truncate(&group.value, 28),
            group.count,
            bar
        );
    }
}
