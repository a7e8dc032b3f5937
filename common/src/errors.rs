// Error handling framework

use thiserror::Error;

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),
}

/// Freshness-check errors
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Freshness query failed for {table}: {source}")]
    QueryFailed {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Freshness query timed out for {table} after {seconds} seconds")]
    Timeout { table: String, seconds: u64 },
}

impl CheckError {
    /// Physical table name the failed check was aimed at.
    pub fn table(&self) -> &str {
        match self {
            CheckError::QueryFailed { table, .. } => table,
            CheckError::Timeout { table, .. } => table,
        }
    }
}

/// Alert delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Webhook returned status {status}: {body}")]
    ErrorResponse { status: u16, body: String },
}
