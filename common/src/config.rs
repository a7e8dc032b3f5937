// Configuration management with layered configuration (file, env, CLI)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub monitor: MonitorConfig,
    pub slack: SlackConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub query_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Logical table names; the physical relation is `<table_prefix><name>`.
    pub tables: Vec<String>,
    pub schema: String,
    pub table_prefix: String,
    pub timestamp_column: String,
    pub freshness_window_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
    pub runbook_url: String,
    pub request_timeout_seconds: u64,
    /// Log alerts instead of posting them.
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

impl MonitorConfig {
    /// Physical relation name for a logical table.
    pub fn physical_name(&self, logical: &str) -> String {
        format!("{}{}", self.table_prefix, logical)
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        // Validate database config
        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.database.query_timeout_seconds == 0 {
            return Err("Database query_timeout_seconds must be greater than 0".to_string());
        }

        // Validate monitor config
        if self.monitor.tables.is_empty() {
            return Err("Monitor tables list cannot be empty".to_string());
        }
        if self.monitor.freshness_window_hours <= 0 {
            return Err("Monitor freshness_window_hours must be greater than 0".to_string());
        }
        // The window becomes a chrono::Duration subtracted from now; keep it
        // inside a range that arithmetic can represent.
        if self.monitor.freshness_window_hours > 24 * 365 {
            return Err(
                "Monitor freshness_window_hours must not exceed 8760 (one year)".to_string(),
            );
        }
        if !is_valid_identifier(&self.monitor.schema) {
            return Err(format!(
                "Invalid schema name '{}': must match [a-z_][a-z0-9_]*",
                self.monitor.schema
            ));
        }
        if !is_valid_identifier(&self.monitor.timestamp_column) {
            return Err(format!(
                "Invalid timestamp column '{}': must match [a-z_][a-z0-9_]*",
                self.monitor.timestamp_column
            ));
        }
        // Table names end up interpolated into SQL, so the full physical
        // name must be a plain identifier.
        for logical in &self.monitor.tables {
            let physical = self.monitor.physical_name(logical);
            if !is_valid_identifier(&physical) {
                return Err(format!(
                    "Invalid table name '{}': must match [a-z_][a-z0-9_]*",
                    physical
                ));
            }
        }

        // Validate Slack config
        if !self.slack.dry_run && self.slack.webhook_url.is_empty() {
            return Err("Slack webhook_url cannot be empty unless dry_run is set".to_string());
        }
        if self.slack.channel.is_empty() {
            return Err("Slack channel cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Lower-case SQL identifier: `[a-z_][a-z0-9_]*`
fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/warehouse".to_string(),
                max_connections: 5,
                min_connections: 1,
                connect_timeout_seconds: 30,
                query_timeout_seconds: 30,
            },
            monitor: MonitorConfig {
                tables: vec![
                    "mailing".to_string(),
                    "user".to_string(),
                    "action".to_string(),
                    "open".to_string(),
                    "usermailing".to_string(),
                    "actionfield".to_string(),
                    "click".to_string(),
                ],
                schema: "ak_sumofus".to_string(),
                table_prefix: "core_".to_string(),
                timestamp_column: "created_at".to_string(),
                freshness_window_hours: 5,
            },
            slack: SlackConfig {
                webhook_url: "https://hooks.slack.com/services/change-me-in-production"
                    .to_string(),
                channel: "#dev_team".to_string(),
                username: "redshift_bot".to_string(),
                icon_emoji: ":monkey_face:".to_string(),
                runbook_url: "https://github.com/SumOfUs/redshift_management/wiki".to_string(),
                request_timeout_seconds: 10,
                dry_run: false,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_empty_database_url() {
        let mut settings = Settings::default();
        settings.database.url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_table_list() {
        let mut settings = Settings::default();
        settings.monitor.tables.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_window() {
        let mut settings = Settings::default();
        settings.monitor.freshness_window_hours = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_oversized_window() {
        let mut settings = Settings::default();

        settings.monitor.freshness_window_hours = i64::MAX;
        assert!(settings.validate().is_err());

        settings.monitor.freshness_window_hours = 8761;
        assert!(settings.validate().is_err());

        settings.monitor.freshness_window_hours = 8760;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_sql_in_table_name() {
        let mut settings = Settings::default();
        settings.monitor.tables.push("user; DROP TABLE x".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_uppercase_schema() {
        let mut settings = Settings::default();
        settings.monitor.schema = "Public".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_requires_webhook_unless_dry_run() {
        let mut settings = Settings::default();
        settings.slack.webhook_url = String::new();
        assert!(settings.validate().is_err());

        settings.slack.dry_run = true;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_physical_name_applies_prefix() {
        let settings = Settings::default();
        assert_eq!(settings.monitor.physical_name("mailing"), "core_mailing");
    }

    const BASE_CONFIG: &str = r##"
[database]
url = "postgresql://localhost/warehouse"
max_connections = 5
min_connections = 1
connect_timeout_seconds = 30
query_timeout_seconds = 30

[monitor]
tables = ["mailing", "user"]
schema = "ak_sumofus"
table_prefix = "core_"
timestamp_column = "created_at"
freshness_window_hours = 5

[slack]
webhook_url = "https://hooks.slack.com/services/T00/B00/XXX"
channel = "#dev_team"
username = "redshift_bot"
icon_emoji = ":monkey_face:"
runbook_url = "https://example.com/runbook"
request_timeout_seconds = 10

[observability]
log_level = "info"
"##;

    #[test]
    fn test_load_from_path_reads_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.toml"), BASE_CONFIG).unwrap();

        let settings = Settings::load_from_path(dir.path()).unwrap();
        assert_eq!(settings.monitor.tables, vec!["mailing", "user"]);
        assert_eq!(settings.monitor.freshness_window_hours, 5);
        assert_eq!(settings.slack.channel, "#dev_team");
        assert!(!settings.slack.dry_run);
        assert!(!settings.observability.json_logs);
    }

    #[test]
    fn test_local_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.toml"), BASE_CONFIG).unwrap();
        std::fs::write(
            dir.path().join("local.toml"),
            "[monitor]\nfreshness_window_hours = 12\n\n[slack]\ndry_run = true\n",
        )
        .unwrap();

        let settings = Settings::load_from_path(dir.path()).unwrap();
        assert_eq!(settings.monitor.freshness_window_hours, 12);
        assert!(settings.slack.dry_run);
        // Values absent from the override keep their defaults
        assert_eq!(settings.slack.channel, "#dev_team");
    }

    #[test]
    fn test_load_from_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load_from_path(dir.path()).is_err());
    }
}
