use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Table Models
// ============================================================================

/// A warehouse table under freshness monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredTable {
    /// Short name used in configuration, e.g. "mailing"
    pub logical: String,
    /// Relation name inside the warehouse schema, e.g. "core_mailing"
    pub physical: String,
}

impl MonitoredTable {
    pub fn new(logical: impl Into<String>, prefix: &str) -> Self {
        let logical = logical.into();
        let physical = format!("{}{}", prefix, logical);
        Self { logical, physical }
    }
}

/// Classification of a single table after one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    /// At least one row landed inside the freshness window
    Fresh { latest: NaiveDateTime },
    /// No rows inside the window; `alerted` records whether the alert
    /// actually reached the webhook
    Stale { alerted: bool },
    /// The freshness query itself failed; no alert is raised
    Failed { error: String },
}

/// Per-table entry in a run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOutcome {
    pub table: String,
    #[serde(flatten)]
    pub status: TableStatus,
}

// ============================================================================
// Run Report Models
// ============================================================================

/// Aggregated result of one monitor invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub checked: usize,
    pub fresh: usize,
    pub stale: usize,
    pub query_failures: usize,
    pub alerts_sent: usize,
    pub alert_failures: usize,
    pub outcomes: Vec<TableOutcome>,
}

impl RunReport {
    pub fn from_outcomes(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        outcomes: Vec<TableOutcome>,
    ) -> Self {
        let mut fresh = 0;
        let mut stale = 0;
        let mut query_failures = 0;
        let mut alerts_sent = 0;
        let mut alert_failures = 0;

        for outcome in &outcomes {
            match outcome.status {
                TableStatus::Fresh { .. } => fresh += 1,
                TableStatus::Stale { alerted } => {
                    stale += 1;
                    if alerted {
                        alerts_sent += 1;
                    } else {
                        alert_failures += 1;
                    }
                }
                TableStatus::Failed { .. } => query_failures += 1,
            }
        }

        Self {
            run_id,
            started_at,
            finished_at,
            checked: outcomes.len(),
            fresh,
            stale,
            query_failures,
            alerts_sent,
            alert_failures,
            outcomes,
        }
    }
}

// ============================================================================
// Alert Models
// ============================================================================

/// Slack incoming-webhook payload (legacy field set)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub channel: String,
    pub username: String,
    pub text: String,
    pub icon_emoji: String,
}
