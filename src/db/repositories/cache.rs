use crate::db::{format_timestamp, parse_timestamp};
use crate::domain::CandidateResult;
use crate::entities::{discovery_cache, prelude::*};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::warn;

pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns the cached list when an entry exists and `now` has not passed
    /// its expiry. A hit bumps the entry's hit counter.
    pub async fn get(
        &self,
        search_term: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<CandidateResult>>> {
        let Some(entry) = DiscoveryCache::find()
            .filter(discovery_cache::Column::SearchTerm.eq(search_term))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let expires_at = parse_timestamp(&entry.expires_at)
            .with_context(|| format!("Invalid expires_at for cache entry {}", entry.id))?;
        if now > expires_at {
            return Ok(None);
        }

        let results: Vec<CandidateResult> = serde_json::from_str(&entry.results_json)
            .with_context(|| format!("Corrupt results_json for cache entry {}", entry.id))?;

        // The entry is fresh either way; a lost counter bump must not turn the
        // hit into a miss.
        if let Err(e) = DiscoveryCache::update_many()
            .col_expr(
                discovery_cache::Column::HitCount,
                Expr::col(discovery_cache::Column::HitCount).add(1),
            )
            .filter(discovery_cache::Column::Id.eq(entry.id))
            .exec(&self.conn)
            .await
        {
            warn!(term = search_term, error = %e, "Failed to bump cache hit count");
        }

        Ok(Some(results))
    }

    /// Inserts or replaces the entry for `search_term`, restarting its expiry
    /// and hit counter.
    pub async fn put(
        &self,
        search_term: &str,
        results: &[CandidateResult],
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<()> {
        let results_json = serde_json::to_string(results)?;
        let expires_at = now
            .checked_add_signed(ttl)
            .context("Cache TTL is out of range")?;

        let active_model = discovery_cache::ActiveModel {
            search_term: Set(search_term.to_string()),
            results_json: Set(results_json),
            created_at: Set(format_timestamp(now)),
            expires_at: Set(format_timestamp(expires_at)),
            hit_count: Set(1),
            ..Default::default()
        };

        DiscoveryCache::insert(active_model)
            .on_conflict(
                OnConflict::column(discovery_cache::Column::SearchTerm)
                    .update_columns([
                        discovery_cache::Column::ResultsJson,
                        discovery_cache::Column::CreatedAt,
                        discovery_cache::Column::ExpiresAt,
                        discovery_cache::Column::HitCount,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = DiscoveryCache::delete_many()
            .filter(discovery_cache::Column::ExpiresAt.lt(format_timestamp(now)))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn hit_count(&self, search_term: &str) -> Result<Option<i32>> {
        let row = DiscoveryCache::find()
            .filter(discovery_cache::Column::SearchTerm.eq(search_term))
            .one(&self.conn)
            .await?;
        Ok(row.map(|r| r.hit_count))
    }

    /// (all entries, entries still fresh at `now`)
    pub async fn counts(&self, now: DateTime<Utc>) -> Result<(u64, u64)> {
        let total = DiscoveryCache::find().count(&self.conn).await?;
        let fresh = DiscoveryCache::find()
            .filter(discovery_cache::Column::ExpiresAt.gte(format_timestamp(now)))
            .count(&self.conn)
            .await?;
        Ok((total, fresh))
    }
}
