// Monitor runner: one stateless pass over the configured tables

use crate::checker::TableChecker;
use crate::config::MonitorConfig;
use crate::models::{MonitoredTable, RunReport, TableOutcome, TableStatus};
use crate::notifier::AlertNotifier;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Drives one freshness pass: checks every table, raises an alert per
/// stale table, and aggregates the outcomes into a report.
pub struct MonitorRunner {
    tables: Vec<MonitoredTable>,
    checker: Arc<dyn TableChecker>,
    notifier: Arc<dyn AlertNotifier>,
}

impl MonitorRunner {
    pub fn new(
        config: &MonitorConfig,
        checker: Arc<dyn TableChecker>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        let tables = config
            .tables
            .iter()
            .map(|logical| MonitoredTable::new(logical.clone(), &config.table_prefix))
            .collect();

        Self {
            tables,
            checker,
            notifier,
        }
    }

    /// Tables this runner covers, in configuration order
    pub fn tables(&self) -> &[MonitoredTable] {
        &self.tables
    }

    /// Run one pass over every configured table.
    ///
    /// This never fails: each table's outcome lands in the report, and the
    /// next scheduled invocation is the retry. A failed check only skips
    /// that table's alert; it does not stop the others.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        tracing::info!(
            run_id = %run_id,
            tables = self.tables.len(),
            "Starting freshness run"
        );

        let checks = self.tables.iter().map(|table| self.check_table(table));
        let outcomes = join_all(checks).await;

        let report = RunReport::from_outcomes(run_id, started_at, Utc::now(), outcomes);

        tracing::info!(
            run_id = %run_id,
            fresh = report.fresh,
            stale = report.stale,
            query_failures = report.query_failures,
            alerts_sent = report.alerts_sent,
            outcomes = %serde_json::to_string(&report.outcomes).unwrap_or_default(),
            "Freshness run finished"
        );

        report
    }

    #[instrument(skip_all, fields(table = %table.physical))]
    async fn check_table(&self, table: &MonitoredTable) -> TableOutcome {
        let status = match self.checker.check(table).await {
            Ok(Some(latest)) => {
                tracing::info!(latest = %latest, "Table is fresh");
                TableStatus::Fresh { latest }
            }
            Ok(None) => {
                tracing::warn!("Table is out of sync, raising alert");
                let alerted = match self.notifier.send_stale_alert(&table.physical).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to deliver stale-table alert");
                        false
                    }
                };
                TableStatus::Stale { alerted }
            }
            Err(e) => {
                tracing::error!(error = %e, "Freshness check failed, skipping alert");
                TableStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        TableOutcome {
            table: table.physical.clone(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CheckError, NotifyError};
    use async_trait::async_trait;
    use chrono::NaiveDateTime;

    struct NeverStale;

    #[async_trait]
    impl TableChecker for NeverStale {
        async fn check(
            &self,
            _table: &MonitoredTable,
        ) -> Result<Option<NaiveDateTime>, CheckError> {
            Ok(Some(Utc::now().naive_utc()))
        }
    }

    struct PanicNotifier;

    #[async_trait]
    impl AlertNotifier for PanicNotifier {
        async fn send_stale_alert(&self, table: &str) -> Result<(), NotifyError> {
            panic!("no alert expected for {}", table);
        }
    }

    #[test]
    fn test_tables_are_built_from_config_order() {
        let config = MonitorConfig {
            tables: vec!["mailing".to_string(), "user".to_string()],
            schema: "ak_sumofus".to_string(),
            table_prefix: "core_".to_string(),
            timestamp_column: "created_at".to_string(),
            freshness_window_hours: 5,
        };

        let runner = MonitorRunner::new(&config, Arc::new(NeverStale), Arc::new(PanicNotifier));
        let physical: Vec<&str> = runner.tables().iter().map(|t| t.physical.as_str()).collect();
        assert_eq!(physical, vec!["core_mailing", "core_user"]);
    }

    #[tokio::test]
    async fn test_fresh_tables_raise_no_alert() {
        let config = MonitorConfig {
            tables: vec!["mailing".to_string()],
            schema: "ak_sumofus".to_string(),
            table_prefix: "core_".to_string(),
            timestamp_column: "created_at".to_string(),
            freshness_window_hours: 5,
        };

        let runner = MonitorRunner::new(&config, Arc::new(NeverStale), Arc::new(PanicNotifier));
        let report = runner.run().await;

        assert_eq!(report.checked, 1);
        assert_eq!(report.fresh, 1);
        assert_eq!(report.alerts_sent, 0);
    }

    #[tokio::test]
    async fn test_report_outcomes_serialize_for_logging() {
        let config = MonitorConfig {
            tables: vec!["mailing".to_string()],
            schema: "ak_sumofus".to_string(),
            table_prefix: "core_".to_string(),
            timestamp_column: "created_at".to_string(),
            freshness_window_hours: 5,
        };

        let runner = MonitorRunner::new(&config, Arc::new(NeverStale), Arc::new(PanicNotifier));
        let report = runner.run().await;

        let json = serde_json::to_string(&report.outcomes).unwrap();
        assert!(json.contains(r#""table":"core_mailing""#));
        assert!(json.contains(r#""status":"fresh""#));
    }
}
