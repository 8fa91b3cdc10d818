use crate::db::format_timestamp;
use crate::entities::{prelude::*, search_metrics};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;

/// One row to append to `search_metrics`.
#[derive(Debug, Clone)]
pub struct NewSearchMetric<'a> {
    pub search_term: &'a str,
    pub result_count: usize,
    pub caller_id: Option<&'a str>,
    pub provider: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub total_searches: u64,
    pub empty_searches: u64,
    pub by_provider: Vec<(String, i64)>,
    pub top_terms: Vec<(String, i64)>,
}

pub struct MetricRepository {
    conn: DatabaseConnection,
}

impl MetricRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(&self, metric: &NewSearchMetric<'_>) -> Result<()> {
        let active_model = search_metrics::ActiveModel {
            search_term: Set(metric.search_term.to_string()),
            result_count: Set(i32::try_from(metric.result_count).unwrap_or(i32::MAX)),
            caller_id: Set(metric.caller_id.map(str::to_string)),
            provider: Set(metric.provider.to_string()),
            created_at: Set(format_timestamp(metric.created_at)),
            ..Default::default()
        };

        SearchMetrics::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<search_metrics::Model>> {
        let rows = SearchMetrics::find()
            .order_by_desc(search_metrics::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Aggregates over rows created at or after `since`.
    pub async fn summary(&self, since: DateTime<Utc>, top: u64) -> Result<MetricSummary> {
        let since = format_timestamp(since);

        let total_searches = SearchMetrics::find()
            .filter(search_metrics::Column::CreatedAt.gte(since.as_str()))
            .count(&self.conn)
            .await?;

        let empty_searches = SearchMetrics::find()
            .filter(search_metrics::Column::CreatedAt.gte(since.as_str()))
            .filter(search_metrics::Column::ResultCount.eq(0))
            .count(&self.conn)
            .await?;

        let by_provider: Vec<(String, i64)> = SearchMetrics::find()
            .select_only()
            .column(search_metrics::Column::Provider)
            .column_as(search_metrics::Column::Id.count(), "count")
            .filter(search_metrics::Column::CreatedAt.gte(since.as_str()))
            .group_by(search_metrics::Column::Provider)
            .order_by_asc(search_metrics::Column::Provider)
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut top_terms: Vec<(String, i64)> = SearchMetrics::find()
            .select_only()
            .column(search_metrics::Column::SearchTerm)
            .column_as(search_metrics::Column::Id.count(), "count")
            .filter(search_metrics::Column::CreatedAt.gte(since.as_str()))
            .group_by(search_metrics::Column::SearchTerm)
            .into_tuple()
            .all(&self.conn)
            .await?;
        top_terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_terms.truncate(usize::try_from(top).unwrap_or(usize::MAX));

        Ok(MetricSummary {
            total_searches,
            empty_searches,
            by_provider,
            top_terms,
        })
    }
}
