// Alert delivery over Slack incoming webhooks

use crate::config::SlackConfig;
use crate::errors::NotifyError;
use crate::models::AlertMessage;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

/// Delivers a staleness alert for one table. Implementations must send
/// exactly one message per call.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send_stale_alert(&self, physical_table: &str) -> Result<(), NotifyError>;
}

/// Notifier that posts to a Slack incoming webhook
pub struct SlackNotifier {
    client: Client,
    config: SlackConfig,
    window_hours: i64,
}

impl SlackNotifier {
    /// Create a new SlackNotifier with the configured request timeout
    pub fn new(config: SlackConfig, window_hours: i64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            window_hours,
        })
    }

    /// Build the webhook payload for a stale table
    pub fn build_message(&self, physical_table: &str) -> AlertMessage {
        let text = format!(
            "<@here>, there might be a problem with the warehouse sync: \n\n\
             *{table}* appears to have not been updated for over {hours} hours. \n\n\
             Please see {runbook} for instructions on what to do next.\n\
             Have a banana!",
            table = physical_table,
            hours = self.window_hours,
            runbook = self.config.runbook_url,
        );

        AlertMessage {
            channel: self.config.channel.clone(),
            username: self.config.username.clone(),
            text,
            icon_emoji: self.config.icon_emoji.clone(),
        }
    }
}

#[async_trait]
impl AlertNotifier for SlackNotifier {
    #[instrument(skip(self))]
    async fn send_stale_alert(&self, physical_table: &str) -> Result<(), NotifyError> {
        let message = self.build_message(physical_table);

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::ErrorResponse {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            table = physical_table,
            channel = %self.config.channel,
            "Stale-table alert delivered"
        );
        Ok(())
    }
}

/// Notifier that only logs, used when `slack.dry_run` is set
pub struct LogAlertNotifier;

#[async_trait]
impl AlertNotifier for LogAlertNotifier {
    async fn send_stale_alert(&self, physical_table: &str) -> Result<(), NotifyError> {
        tracing::warn!(
            table = physical_table,
            "Stale-table alert suppressed (dry run)"
        );
        Ok(())
    }
}
