// Monitor binary entry point: one freshness pass per invocation

use anyhow::Result;
use common::checker::{StalenessChecker, TableChecker};
use common::config::Settings;
use common::db::DbPool;
use common::notifier::{AlertNotifier, LogAlertNotifier, SlackNotifier};
use common::runner::MonitorRunner;
use common::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging; the log level comes from it
    let settings =
        Settings::load().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    telemetry::init_logging(
        &settings.observability.log_level,
        settings.observability.json_logs,
    )?;

    info!(
        tables = settings.monitor.tables.len(),
        schema = %settings.monitor.schema,
        window_hours = settings.monitor.freshness_window_hours,
        dry_run = settings.slack.dry_run,
        "Starting warehouse sync monitor"
    );

    // Lazy pool: an unreachable warehouse surfaces as per-table outcomes
    // in the run report instead of a startup failure.
    let db_pool = DbPool::connect_lazy(&settings.database).map_err(|e| {
        error!(error = %e, "Failed to initialize database pool");
        anyhow::anyhow!("Database initialization error: {}", e)
    })?;

    let checker: Arc<dyn TableChecker> = Arc::new(StalenessChecker::new(
        db_pool.clone(),
        &settings.monitor,
        Duration::from_secs(settings.database.query_timeout_seconds),
    ));

    let notifier: Arc<dyn AlertNotifier> = if settings.slack.dry_run {
        info!("Dry run enabled, alerts will be logged instead of sent");
        Arc::new(LogAlertNotifier)
    } else {
        Arc::new(
            SlackNotifier::new(
                settings.slack.clone(),
                settings.monitor.freshness_window_hours,
            )
            .map_err(|e| {
                error!(error = %e, "Failed to initialize Slack notifier");
                anyhow::anyhow!("Notifier initialization error: {}", e)
            })?,
        )
    };

    let runner = MonitorRunner::new(&settings.monitor, checker, notifier);
    let report = runner.run().await;

    info!(
        run_id = %report.run_id,
        checked = report.checked,
        fresh = report.fresh,
        stale = report.stale,
        query_failures = report.query_failures,
        alerts_sent = report.alerts_sent,
        alert_failures = report.alert_failures,
        "execution done"
    );

    db_pool.close().await;

    Ok(())
}
