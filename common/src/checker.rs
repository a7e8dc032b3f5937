// Staleness checks against the warehouse

use crate::config::MonitorConfig;
use crate::db::DbPool;
use crate::errors::CheckError;
use crate::models::MonitoredTable;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::Row;
use std::time::Duration;
use tracing::instrument;

/// Answers "when did this table last receive a row inside the window?"
///
/// `Ok(None)` means no row qualified, which is the stale case.
#[async_trait]
pub trait TableChecker: Send + Sync {
    async fn check(&self, table: &MonitoredTable) -> Result<Option<NaiveDateTime>, CheckError>;
}

/// Render the freshness cutoff for a given instant: UTC wall clock,
/// whole seconds, no timezone marker. Warehouse timestamps are stored
/// timezone-naive, so the bound must not carry an offset.
pub fn cutoff_string(now: DateTime<Utc>, window: chrono::Duration) -> String {
    (now - window).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Build the single freshness statement for a table.
///
/// `MAX` over zero qualifying rows collapses to NULL, so "nothing recent"
/// needs no second round trip, and the window predicate keeps the scan
/// bounded. Identifiers are validated at configuration load; only the
/// cutoff travels as a bind parameter.
pub fn freshness_query(schema: &str, table: &str, column: &str) -> String {
    format!(
        "SELECT MAX({column}) FROM {schema}.{table} WHERE {column} > $1::timestamp",
        column = column,
        schema = schema,
        table = table,
    )
}

/// Freshness checker backed by the warehouse connection pool
pub struct StalenessChecker {
    pool: DbPool,
    schema: String,
    timestamp_column: String,
    window: chrono::Duration,
    query_timeout: Duration,
}

impl StalenessChecker {
    pub fn new(pool: DbPool, config: &MonitorConfig, query_timeout: Duration) -> Self {
        Self {
            pool,
            schema: config.schema.clone(),
            timestamp_column: config.timestamp_column.clone(),
            window: chrono::Duration::hours(config.freshness_window_hours),
            query_timeout,
        }
    }

    fn query_for(&self, table: &MonitoredTable) -> String {
        freshness_query(&self.schema, &table.physical, &self.timestamp_column)
    }
}

#[async_trait]
impl TableChecker for StalenessChecker {
    #[instrument(skip_all, fields(table = %table.physical))]
    async fn check(&self, table: &MonitoredTable) -> Result<Option<NaiveDateTime>, CheckError> {
        let cutoff = cutoff_string(Utc::now(), self.window);
        let query = self.query_for(table);

        tracing::debug!(cutoff = %cutoff, "Running freshness query");

        let fetch = sqlx::query(&query).bind(&cutoff).fetch_one(self.pool.pool());

        let row = match tokio::time::timeout(self.query_timeout, fetch).await {
            Ok(result) => result.map_err(|e| CheckError::QueryFailed {
                table: table.physical.clone(),
                source: e,
            })?,
            Err(_) => {
                return Err(CheckError::Timeout {
                    table: table.physical.clone(),
                    seconds: self.query_timeout.as_secs(),
                })
            }
        };

        let latest: Option<NaiveDateTime> =
            row.try_get(0).map_err(|e| CheckError::QueryFailed {
                table: table.physical.clone(),
                source: e,
            })?;

        Ok(latest)
    }
}
