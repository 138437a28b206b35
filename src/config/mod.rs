#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

use crate::adapters::postgres::DEFAULT_TABLE;
use crate::core::ConfigProvider;
use crate::domain::model::LoadFailurePolicy;
use crate::utils::error::{EtlError, Result};
use crate::utils::retry::RetryPolicy;
use crate::utils::validation::{self, Validate};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "https://api.nasa.gov/neo/rest/v1/feed";
pub const DEFAULT_DATABASE: &str = "postgres";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Everything one run needs, resolved once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
    pub api: ApiConfig,
    /// Optional only when the CSV sink replaces PostgreSQL.
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default = "today")]
    pub start_date: String,
}

#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_table")]
    pub table: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoadConfig {
    #[serde(default)]
    pub on_failure: LoadFailurePolicy,
    /// Write to this CSV file instead of PostgreSQL.
    pub csv_output: Option<PathBuf>,
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_max_retries() -> u32 {
    RetryPolicy::default().max_retries
}

fn default_delay_seconds() -> u64 {
    RetryPolicy::default().delay.as_secs()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.delay_seconds))
    }
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            url: default_feed_url(),
            api_key: api_key.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl DatabaseConfig {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            host: host.into(),
            database: default_database(),
            table: default_table(),
        }
    }

    /// `postgresql://<user>:<password>@<host>/<database>` with credentials percent-encoded.
    pub fn connection_url(&self) -> Result<String> {
        let base = format!("postgresql://{}/{}", self.host, self.database);
        let mut url = Url::parse(&base).map_err(|e| EtlError::InvalidConfigValue {
            field: "database.host".to_string(),
            value: self.host.clone(),
            reason: format!("Cannot build connection URL: {}", e),
        })?;

        url.set_username(&self.user)
            .and_then(|_| url.set_password(Some(&self.password)))
            .map_err(|_| EtlError::Config {
                message: "database host cannot carry credentials".to_string(),
            })?;

        Ok(url.to_string())
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("table", &self.table)
            .finish()
    }
}

impl EtlConfig {
    pub fn new(api: ApiConfig, database: Option<DatabaseConfig>) -> Self {
        Self {
            api,
            database,
            retry: RetryConfig::default(),
            load: LoadConfig::default(),
            start_date: today(),
        }
    }

    /// 取得資料庫設定；未使用 CSV 輸出時為必填
    pub fn database(&self) -> Result<&DatabaseConfig> {
        validation::validate_required_field("database", &self.database)
    }
}

impl ConfigProvider for EtlConfig {
    fn api_endpoint(&self) -> &str {
        &self.api.url
    }

    fn api_key(&self) -> &str {
        &self.api.api_key
    }

    fn start_date(&self) -> &str {
        &self.start_date
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry.policy()
    }

    fn load_failure_policy(&self) -> LoadFailurePolicy {
        self.load.on_failure
    }
}

impl Validate for EtlConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        // API 設定
        validate_url("api.url", &self.api.url)?;
        validate_secret("api.api_key", &self.api.api_key)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;

        validate_iso_date("start_date", &self.start_date)?;

        validate_range("retry.max_retries", self.retry.max_retries, 0, 10)?;
        validate_range("retry.delay_seconds", self.retry.delay_seconds, 0, 3600)?;

        // 輸出目標：CSV 或 PostgreSQL
        match &self.load.csv_output {
            Some(path) => validate_path("load.csv_output", &path.to_string_lossy())?,
            None => {
                let db = self.database()?;
                validate_non_empty_string("database.user", &db.user)?;
                validate_non_empty_string("database.host", &db.host)?;
                validate_identifier("database.database", &db.database)?;
                validate_identifier("database.table", &db.table)?;
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
