use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    /// The request URL is stripped on conversion; it carries the API key.
    #[error("API request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Load stopped after {written} rows: {source}")]
    LoadInterrupted {
        written: u64,
        #[source]
        source: Box<EtlError>,
    },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<reqwest::Error> for EtlError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

impl EtlError {
    /// Rows already stored when a write fails are kept; zero keeps the plain error.
    pub fn interrupted(written: u64, source: EtlError) -> Self {
        if written == 0 {
            return source;
        }
        Self::LoadInterrupted {
            written,
            source: Box::new(source),
        }
    }

    /// Rows a failed load left behind in the sink.
    pub fn rows_written(&self) -> u64 {
        match self {
            Self::LoadInterrupted { written, .. } => *written,
            _ => 0,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Transport level failures are the only ones worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder() && !e.is_decode(),
            _ => false,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Http(_) => ErrorSeverity::Medium,
            Self::MalformedPayload { .. } | Self::Serialization(_) => ErrorSeverity::High,
            Self::Database(_) | Self::Csv(_) | Self::Io(_) | Self::LoadInterrupted { .. } => {
                ErrorSeverity::Critical
            }
            Self::Config { .. } | Self::MissingConfig { .. } | Self::InvalidConfigValue { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::LoadInterrupted { source, .. } => source.recovery_suggestion(),
            Self::Http(_) => "Check network connectivity and that the API endpoint is reachable",
            Self::Database(_) => {
                "Check the PostgreSQL credentials, host and that the target table exists"
            }
            Self::Csv(_) | Self::Io(_) => "Check that the output path exists and is writable",
            Self::Serialization(_) | Self::MalformedPayload { .. } => {
                "Check the API key and that the endpoint returns a NeoWs feed payload"
            }
            Self::Config { .. } | Self::InvalidConfigValue { .. } => {
                "Fix the configuration value and run again"
            }
            Self::MissingConfig { .. } => {
                "Set the missing environment variable (or .env entry) or provide a --config file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_not_transient() {
        let err = EtlError::MissingConfig {
            field: "API_KEY".to_string(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.to_string(), "Missing configuration value: API_KEY");
    }

    #[test]
    fn test_malformed_payload_message() {
        let err = EtlError::malformed("missing `near_earth_objects`");
        assert_eq!(
            err.to_string(),
            "Malformed payload: missing `near_earth_objects`"
        );
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_interrupted_load_keeps_partial_count() {
        let io = || std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");

        let err = EtlError::interrupted(2, EtlError::Io(io()));
        assert_eq!(err.rows_written(), 2);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.to_string(), "Load stopped after 2 rows: IO error: broken pipe");

        let err = EtlError::interrupted(0, EtlError::Io(io()));
        assert!(matches!(err, EtlError::Io(_)));
        assert_eq!(err.rows_written(), 0);
    }
}
