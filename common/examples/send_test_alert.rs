use common::config::SlackConfig;
use common::notifier::{AlertNotifier, SlackNotifier};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let webhook_url = env::var("SLACK_WEBHOOK_URL")?;
    let channel = env::var("SLACK_CHANNEL").unwrap_or_else(|_| "#dev_team".to_string());
    let table = env::args().nth(1).unwrap_or_else(|| "core_test".to_string());

    println!("Posting test alert for {} to {}", table, channel);

    let config = SlackConfig {
        webhook_url,
        channel,
        username: "redshift_bot".to_string(),
        icon_emoji: ":monkey_face:".to_string(),
        runbook_url: "https://github.com/SumOfUs/redshift_management/wiki".to_string(),
        request_timeout_seconds: 10,
        dry_run: false,
    };

    let notifier = SlackNotifier::new(config, 5)?;
    notifier.send_stale_alert(&table).await?;

    println!("  -> Alert delivered");

    Ok(())
}
