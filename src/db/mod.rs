use crate::domain::CandidateResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::search_metrics::Model as SearchMetricRow;
pub use repositories::metrics::{MetricSummary, NewSearchMetric};
pub use repositories::rate_limit::WindowState;

/// Timestamps are stored as fixed-width RFC 3339 strings in UTC, so string
/// comparison in SQL agrees with chronological order.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp: {raw}"))
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(std::time::Duration::from_secs(10))
            .acquire_timeout(std::time::Duration::from_secs(10))
            .idle_timeout(std::time::Duration::from_secs(300))
            .max_lifetime(std::time::Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    fn rate_limit_repo(&self) -> repositories::rate_limit::RateLimitRepository {
        repositories::rate_limit::RateLimitRepository::new(self.conn.clone())
    }

    fn metric_repo(&self) -> repositories::metrics::MetricRepository {
        repositories::metrics::MetricRepository::new(self.conn.clone())
    }

    // ========== Discovery cache ==========

    pub async fn get_cached_discovery(
        &self,
        search_term: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<CandidateResult>>> {
        self.cache_repo().get(search_term, now).await
    }

    pub async fn cache_discovery(
        &self,
        search_term: &str,
        results: &[CandidateResult],
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<()> {
        self.cache_repo().put(search_term, results, now, ttl).await
    }

    pub async fn purge_expired_cache(&self, now: DateTime<Utc>) -> Result<u64> {
        self.cache_repo().purge_expired(now).await
    }

    pub async fn cache_hit_count(&self, search_term: &str) -> Result<Option<i32>> {
        self.cache_repo().hit_count(search_term).await
    }

    pub async fn cache_counts(&self, now: DateTime<Utc>) -> Result<(u64, u64)> {
        self.cache_repo().counts(now).await
    }

    // ========== Rate limiting ==========

    pub async fn record_request(
        &self,
        caller_id: &str,
        now: DateTime<Utc>,
        max_requests: u32,
        window: Duration,
    ) -> Result<WindowState> {
        self.rate_limit_repo()
            .record_request(caller_id, now, max_requests, window)
            .await
    }

    pub async fn purge_stale_rate_limits(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<u64> {
        self.rate_limit_repo().purge_stale(now, window).await
    }

    // ========== Search metrics ==========

    pub async fn record_search_metric(&self, metric: &NewSearchMetric<'_>) -> Result<()> {
        self.metric_repo().record(metric).await
    }

    pub async fn recent_search_metrics(&self, limit: u64) -> Result<Vec<SearchMetricRow>> {
        self.metric_repo().recent(limit).await
    }

    pub async fn search_metric_summary(
        &self,
        since: DateTime<Utc>,
        top: u64,
    ) -> Result<MetricSummary> {
        self.metric_repo().summary(since, top).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResultSource;

    async fn temp_store() -> Store {
        let db_path =
            std::env::temp_dir().join(format!("linkscout-db-test-{}.db", uuid::Uuid::new_v4()));
        Store::new(&format!("sqlite:{}", db_path.display()))
            .await
            .unwrap()
    }

    fn candidate(slug: &str, confidence: f64) -> CandidateResult {
        CandidateResult {
            url: format!("https://www.linkedin.com/company/{slug}"),
            company_name: slug.to_string(),
            vanity_name: slug.to_string(),
            description: String::new(),
            confidence,
            source: ResultSource::Search,
        }
    }

    fn at(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let ts = format_timestamp(at("2026-03-01T10:00:00Z"));
        assert_eq!(ts, "2026-03-01T10:00:00.000Z");
        assert_eq!(parse_timestamp(&ts).unwrap(), at("2026-03-01T10:00:00Z"));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_cache_round_trip_and_hit_count() {
        let store = temp_store().await;
        let now = at("2026-03-01T10:00:00Z");
        let results = vec![candidate("stripe", 0.95), candidate("stripe-inc", 0.7)];

        assert!(store.get_cached_discovery("stripe", now).await.unwrap().is_none());

        store
            .cache_discovery("stripe", &results, now, Duration::days(7))
            .await
            .unwrap();

        let cached = store
            .get_cached_discovery("stripe", now + Duration::days(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached, results);

        store
            .get_cached_discovery("stripe", now + Duration::days(2))
            .await
            .unwrap();
        assert_eq!(store.cache_hit_count("stripe").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_cache_expiry_and_overwrite() {
        let store = temp_store().await;
        let now = at("2026-03-01T10:00:00Z");
        let ttl = Duration::days(7);

        store
            .cache_discovery("acme", &[candidate("acme", 0.6)], now, ttl)
            .await
            .unwrap();

        let exactly_expiring = now + ttl;
        assert!(
            store
                .get_cached_discovery("acme", exactly_expiring)
                .await
                .unwrap()
                .is_some()
        );

        let later = now + ttl + Duration::seconds(1);
        assert!(store.get_cached_discovery("acme", later).await.unwrap().is_none());

        let refreshed = vec![candidate("acme-corp", 0.85)];
        store.cache_discovery("acme", &refreshed, later, ttl).await.unwrap();
        assert_eq!(
            store.get_cached_discovery("acme", later).await.unwrap(),
            Some(refreshed)
        );
        assert_eq!(store.cache_hit_count("acme").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_cache_hit_survives_failed_counter_update() {
        let store = temp_store().await;
        let now = at("2026-03-01T10:00:00Z");
        let results = vec![candidate("globex", 0.95)];

        store
            .cache_discovery("globex", &results, now, Duration::days(7))
            .await
            .unwrap();
        store
            .conn
            .execute_unprepared(
                "CREATE TRIGGER reject_cache_updates BEFORE UPDATE ON discovery_cache \
                 BEGIN SELECT RAISE(ABORT, 'read only'); END",
            )
            .await
            .unwrap();

        assert_eq!(
            store.get_cached_discovery("globex", now).await.unwrap(),
            Some(results)
        );
        assert_eq!(store.cache_hit_count("globex").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_purge_expired_cache() {
        let store = temp_store().await;
        let now = at("2026-03-01T10:00:00Z");

        store
            .cache_discovery("old", &[], now - Duration::days(8), Duration::days(7))
            .await
            .unwrap();
        store
            .cache_discovery("new", &[], now, Duration::days(7))
            .await
            .unwrap();

        assert_eq!(store.cache_counts(now).await.unwrap(), (2, 1));
        assert_eq!(store.purge_expired_cache(now).await.unwrap(), 1);
        assert_eq!(store.cache_counts(now).await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_rate_limit_window() {
        let store = temp_store().await;
        let start = at("2026-03-01T10:00:00Z");
        let window = Duration::hours(1);

        assert_eq!(
            store.record_request("1.2.3.4", start, 3, window).await.unwrap(),
            WindowState::Started
        );
        assert_eq!(
            store.record_request("1.2.3.4", start, 3, window).await.unwrap(),
            WindowState::Counted { count: 2 }
        );
        assert_eq!(
            store.record_request("1.2.3.4", start, 3, window).await.unwrap(),
            WindowState::Counted { count: 3 }
        );
        assert_eq!(
            store
                .record_request("1.2.3.4", start + Duration::minutes(59), 3, window)
                .await
                .unwrap(),
            WindowState::Exhausted {
                window_start: start
            }
        );

        // Other callers have their own window.
        assert_eq!(
            store.record_request("5.6.7.8", start, 3, window).await.unwrap(),
            WindowState::Started
        );

        assert_eq!(
            store
                .record_request("1.2.3.4", start + window, 3, window)
                .await
                .unwrap(),
            WindowState::Started
        );
        assert_eq!(
            store
                .record_request("1.2.3.4", start + window, 3, window)
                .await
                .unwrap(),
            WindowState::Counted { count: 2 }
        );
    }

    #[tokio::test]
    async fn test_out_of_range_durations_are_errors() {
        let store = temp_store().await;
        let now = at("2026-03-01T10:00:00Z");

        assert!(
            store
                .cache_discovery("acme", &[], now, Duration::MAX)
                .await
                .is_err()
        );
        assert!(
            store
                .record_request("1.2.3.4", now, 3, Duration::MAX)
                .await
                .is_err()
        );
        assert!(store.purge_stale_rate_limits(now, Duration::MAX).await.is_err());
    }

    #[tokio::test]
    async fn test_search_metrics_summary() {
        let store = temp_store().await;
        let now = at("2026-03-01T10:00:00Z");

        for (term, count, provider) in [
            ("stripe", 2, "brave"),
            ("stripe", 1, "google_cse"),
            ("acme", 0, "guess"),
        ] {
            store
                .record_search_metric(&NewSearchMetric {
                    search_term: term,
                    result_count: count,
                    caller_id: Some("1.2.3.4"),
                    provider,
                    created_at: now,
                })
                .await
                .unwrap();
        }
        store
            .record_search_metric(&NewSearchMetric {
                search_term: "ancient",
                result_count: 1,
                caller_id: None,
                provider: "brave",
                created_at: now - Duration::days(30),
            })
            .await
            .unwrap();

        let summary = store
            .search_metric_summary(now - Duration::days(1), 10)
            .await
            .unwrap();
        assert_eq!(summary.total_searches, 3);
        assert_eq!(summary.empty_searches, 1);
        assert_eq!(
            summary.by_provider,
            vec![
                ("brave".to_string(), 1),
                ("google_cse".to_string(), 1),
                ("guess".to_string(), 1)
            ]
        );
        assert_eq!(summary.top_terms[0], ("stripe".to_string(), 2));

        let recent = store.recent_search_metrics(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].search_term, "ancient");
        assert_eq!(recent[0].caller_id, None);
    }
}
