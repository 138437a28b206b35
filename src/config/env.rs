use crate::config::{ApiConfig, DatabaseConfig, EtlConfig};
use crate::utils::error::{EtlError, Result};
use std::str::FromStr;

pub const API_KEY: &str = "API_KEY";
pub const URL: &str = "URL";
pub const PG_USER: &str = "PG_USER";
pub const PG_PASSWORD: &str = "PG_PASSWORD";
pub const PG_HOST: &str = "PG_HOST";
pub const PG_DATABASE: &str = "PG_DATABASE";
pub const PG_TABLE: &str = "PG_TABLE";
pub const RETRY_ATTEMPTS: &str = "ETL_RETRY_ATTEMPTS";
pub const RETRY_DELAY_SECONDS: &str = "ETL_RETRY_DELAY_SECONDS";
pub const TIMEOUT_SECONDS: &str = "ETL_TIMEOUT_SECONDS";
pub const LOAD_FAILURE_POLICY: &str = "ETL_LOAD_FAILURE_POLICY";

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, name: &str) -> Result<String> {
        self.get(name).ok_or_else(|| EtlError::MissingConfig {
            field: name.to_string(),
        })
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|raw| {
                raw.trim().parse().map_err(|e: T::Err| EtlError::InvalidConfigValue {
                    field: name.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

impl EtlConfig {
    /// Build the configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`EtlConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let mut api = ApiConfig::new(vars.require(API_KEY)?);
        if let Some(url) = vars.get(URL) {
            api.url = url;
        }
        if let Some(timeout) = vars.parse(TIMEOUT_SECONDS)? {
            api.timeout_seconds = timeout;
        }

        let mut config = EtlConfig::new(api, Self::database_from(&vars)?);

        if let Some(attempts) = vars.parse(RETRY_ATTEMPTS)? {
            config.retry.max_retries = attempts;
        }
        if let Some(delay) = vars.parse(RETRY_DELAY_SECONDS)? {
            config.retry.delay_seconds = delay;
        }
        if let Some(policy) = vars.parse(LOAD_FAILURE_POLICY)? {
            config.load.on_failure = policy;
        }

        tracing::info!("All ENV variables have been loaded");
        Ok(config)
    }

    // 完全沒有設定 PG_* 時視為不使用資料庫（例如只輸出 CSV）
    fn database_from<F>(vars: &Vars<F>) -> Result<Option<DatabaseConfig>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let any_set = [PG_USER, PG_PASSWORD, PG_HOST]
            .iter()
            .any(|name| vars.get(name).is_some());
        if !any_set {
            return Ok(None);
        }

        let mut db = DatabaseConfig::new(
            vars.require(PG_USER)?,
            vars.get(PG_PASSWORD).unwrap_or_default(),
            vars.require(PG_HOST)?,
        );
        if let Some(database) = vars.get(PG_DATABASE) {
            db.database = database;
        }
        if let Some(table) = vars.get(PG_TABLE) {
            db.table = table;
        }

        Ok(Some(db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FEED_URL;
    use crate::domain::model::LoadFailurePolicy;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_reads_required_variables() {
        let config = EtlConfig::from_lookup(lookup_from(&[
            (API_KEY, "KEY"),
            (URL, "https://api.nasa.gov/neo/rest/v1/feed"),
            (PG_USER, "etl"),
            (PG_PASSWORD, "secret"),
            (PG_HOST, "localhost"),
        ]))
        .unwrap();

        assert_eq!(config.api.api_key, "KEY");
        let db = config.database().unwrap();
        assert_eq!(db.user, "etl");
        assert_eq!(db.host, "localhost");
        assert_eq!(db.database, "postgres");
        assert_eq!(db.table, "asteroid");
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.delay_seconds, 60);
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let err = EtlConfig::from_lookup(lookup_from(&[(PG_HOST, "localhost")])).unwrap_err();

        match err {
            EtlError::MissingConfig { field } => assert_eq!(field, API_KEY),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_partial_database_settings_are_reported() {
        let err = EtlConfig::from_lookup(lookup_from(&[(API_KEY, "KEY"), (PG_USER, "etl")]))
            .unwrap_err();

        assert!(matches!(err, EtlError::MissingConfig { field } if field == PG_HOST));
    }

    #[test]
    fn test_optional_overrides() {
        let config = EtlConfig::from_lookup(lookup_from(&[
            (API_KEY, "KEY"),
            (RETRY_ATTEMPTS, "0"),
            (RETRY_DELAY_SECONDS, "5"),
            (TIMEOUT_SECONDS, "10"),
            (LOAD_FAILURE_POLICY, "fail"),
        ]))
        .unwrap();

        assert_eq!(config.api.url, DEFAULT_FEED_URL);
        assert!(config.database.is_none());
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.delay_seconds, 5);
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.load.on_failure, LoadFailurePolicy::Fail);
    }

    #[test]
    fn test_unparsable_number_is_reported() {
        let err = EtlConfig::from_lookup(lookup_from(&[(API_KEY, "KEY"), (RETRY_ATTEMPTS, "two")]))
            .unwrap_err();

        assert!(matches!(err, EtlError::InvalidConfigValue { field, .. } if field == RETRY_ATTEMPTS));
    }
}
