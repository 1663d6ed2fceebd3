use crate::error::*;
use std::time::Duration;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Fetch(e) => {
                error!("Fetch error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Fetch(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::Fetch(e) => e.retry_after(),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Fetch(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(e) => format!("Could not read or write a file: {}", e),
            CoreError::Serialization(_) => "Input or output data is not valid JSON.".to_string(),
            CoreError::Export { message } => format!("Export failed: {}", message),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Fetch(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Export { .. } => "EXPORT".to_string(),
        }
    }
}

impl ErrorExt for FetchError {
    fn log_error(&self) -> &Self {
        error!("FetchError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("FetchError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status_code, .. } => {
                *status_code == 429 || (500..600).contains(status_code)
            }
            FetchError::Timeout { .. } => true,
            FetchError::Network { .. } => true,
            FetchError::Parse { .. } => false,
            FetchError::InvalidUrl { .. } => false,
        }
    }

    /// Server-provided wait hint; `None` lets the caller pick its own backoff.
    fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::Status {
                retry_after: Some(seconds),
                ..
            } => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            FetchError::Status { status_code: 429, .. } => {
                "Reddit is rate limiting anonymous requests. Try again later.".to_string()
            }
            FetchError::Status { status_code: 403, url, .. } => {
                format!("Access to {} was denied. The channel may be private.", url)
            }
            FetchError::Status { status_code: 404, url, .. } => {
                format!("Nothing found at {}. Check the channel name.", url)
            }
            FetchError::Status { status_code, .. } => {
                format!("Reddit answered with HTTP {}.", status_code)
            }
            FetchError::Timeout { seconds, .. } => {
                format!("Reddit did not answer within {} seconds.", seconds)
            }
            FetchError::Parse { .. } => "Reddit returned a response that is not JSON.".to_string(),
            FetchError::Network { .. } => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            FetchError::InvalidUrl { url } => format!("Could not build a request URL from {}.", url),
        }
    }

    fn error_code(&self) -> String {
        match self {
            FetchError::Status { status_code: 429, .. } => "FETCH_RATE_LIMIT".to_string(),
            FetchError::Status { status_code, .. } if *status_code >= 500 => {
                "FETCH_SERVER_ERROR".to_string()
            }
            FetchError::Status { .. } => "FETCH_STATUS".to_string(),
            FetchError::Timeout { .. } => "FETCH_TIMEOUT".to_string(),
            FetchError::Parse { .. } => "FETCH_PARSE".to_string(),
            FetchError::Network { .. } => "FETCH_NETWORK".to_string(),
            FetchError::InvalidUrl { .. } => "FETCH_INVALID_URL".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => format!("File not found: {}", path),
            ConfigError::InvalidFormat { .. } => {
                "Input or settings file format is invalid.".to_string()
            }
            ConfigError::MissingField { field } => {
                format!("Required field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, value } => {
                format!("Invalid value '{}' for field '{}'.", value, field)
            }
            ConfigError::ValidationFailed { reason } => reason.clone(),
            ConfigError::Parse(_) => "Settings file is not valid TOML.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidFormat { .. } => "CONFIG_INVALID_FORMAT".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}
