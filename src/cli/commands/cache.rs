use chrono::Utc;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_cache_purge(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let now = Utc::now();

    let entries = store.purge_expired_cache(now).await?;
    let windows = store
        .purge_stale_rate_limits(now, config.rate_limit.window())
        .await?;

    println!("✓ Removed {entries} expired cache entries and {windows} stale rate-limit windows");
    Ok(())
}
