use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export failed: {message}")]
    Export { message: String },
}

/// Failure of a single HTTP call against the public API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request to {url} failed with status {status_code}")]
    Status {
        status_code: u16,
        url: String,
        retry_after: Option<u64>,
    },

    #[error("Request to {url} timed out after {seconds} seconds")]
    Timeout { url: String, seconds: u64 },

    #[error("Invalid JSON from {url}: {details}")]
    Parse { url: String, details: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid request URL: {url}")]
    InvalidUrl { url: String },
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Parse { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::InvalidUrl { url } => url,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
