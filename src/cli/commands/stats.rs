use chrono::{Duration, Utc};

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_stats(config: &Config, days: u32, top: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let now = Utc::now();

    let summary = store
        .search_metric_summary(now - Duration::days(i64::from(days)), top)
        .await?;
    let (cached_total, cached_fresh) = store.cache_counts(now).await?;

    println!("Search statistics (last {days} days)");
    println!("{:-<50}", "");
    println!("Searches:         {}", summary.total_searches);
    println!("Without results:  {}", summary.empty_searches);
    println!("Cache entries:    {cached_fresh} fresh / {cached_total} total");

    if !summary.by_provider.is_empty() {
        println!();
        println!("By provider:");
        for (provider, count) in &summary.by_provider {
            println!("  {provider:<12} {count}");
        }
    }

    if !summary.top_terms.is_empty() {
        println!();
        println!("Top terms:");
        for (term, count) in &summary.top_terms {
            println!("  {count:>5}  {term}");
        }
    }

    Ok(())
}
