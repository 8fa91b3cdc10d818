use crate::db::{format_timestamp, parse_timestamp};
use crate::entities::{prelude::*, rate_limits};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    Statement,
};

/// Counts one request and resets an elapsed window in a single statement, so
/// concurrent requests from one caller serialize on the row instead of racing
/// between a read and a write.
const RECORD_REQUEST_SQL: &str = r"
INSERT INTO rate_limits (caller_id, request_count, window_start)
VALUES (?1, 1, ?2)
ON CONFLICT (caller_id) DO UPDATE SET
    request_count = CASE
        WHEN rate_limits.window_start <= ?3 THEN 1
        ELSE rate_limits.request_count + 1
    END,
    window_start = CASE
        WHEN rate_limits.window_start <= ?3 THEN excluded.window_start
        ELSE rate_limits.window_start
    END
RETURNING request_count, window_start
";

/// What happened to a caller's window when one request was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// No window, or the previous one elapsed: a new one starts at count 1.
    Started,
    /// Counted inside the current window; `count` includes this request.
    Counted { count: u32 },
    /// This request went over the ceiling.
    Exhausted { window_start: DateTime<Utc> },
}

pub struct RateLimitRepository {
    conn: DatabaseConnection,
}

impl RateLimitRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Increments (or creates) the caller's counter atomically and classifies
    /// the new count against `max_requests`.
    ///
    /// Requests past the ceiling keep incrementing the counter; the window
    /// still resets once `window` has elapsed since it started.
    pub async fn record_request(
        &self,
        caller_id: &str,
        now: DateTime<Utc>,
        max_requests: u32,
        window: Duration,
    ) -> Result<WindowState> {
        let cutoff = now
            .checked_sub_signed(window)
            .context("Rate limit window is out of range")?;

        let row = self
            .conn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                RECORD_REQUEST_SQL,
                [
                    caller_id.into(),
                    format_timestamp(now).into(),
                    format_timestamp(cutoff).into(),
                ],
            ))
            .await?
            .context("Rate limit upsert returned no row")?;

        let count: i32 = row.try_get("", "request_count")?;
        let window_start: String = row.try_get("", "window_start")?;
        let count = u32::try_from(count).unwrap_or(0);

        Ok(if count <= 1 {
            WindowState::Started
        } else if count <= max_requests {
            WindowState::Counted { count }
        } else {
            WindowState::Exhausted {
                window_start: parse_timestamp(&window_start)
                    .with_context(|| format!("Invalid window_start for caller {caller_id}"))?,
            }
        })
    }

    /// Deletes windows that started more than `window` ago; they would be
    /// restarted on the next request anyway.
    pub async fn purge_stale(&self, now: DateTime<Utc>, window: Duration) -> Result<u64> {
        let threshold = now
            .checked_sub_signed(window)
            .context("Rate limit window is out of range")?;
        let result = RateLimits::delete_many()
            .filter(rate_limits::Column::WindowStart.lte(format_timestamp(threshold)))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
