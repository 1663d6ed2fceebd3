use crate::error::ConfigError;
use crate::types::{SortMode, TimeWindow, WorkItem, MAX_ITEMS_PER_REQUEST};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_POST_LIMIT: u32 = 25;
pub const DEFAULT_MAX_COMMENTS: u32 = 10;
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Strips surrounding whitespace and any leading `r/` or `/r/` marker
/// (case-insensitive). Applying it twice gives the same result as once.
pub fn normalize_channel_name(name: &str) -> String {
    let mut rest = name.trim();
    loop {
        let candidate = rest.strip_prefix('/').unwrap_or(rest);
        match candidate.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("r/") => rest = candidate[2..].trim_start(),
            _ => break,
        }
    }
    rest.trim_end_matches('/').trim().to_string()
}

/// Raw run input as supplied by the caller, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunInput {
    pub subreddits: Vec<String>,
    pub search_query: Option<String>,
    pub sort_by: Option<String>,
    pub time_filter: Option<String>,
    pub limit: Option<i64>,
    pub include_comments: bool,
    pub max_comments_per_post: Option<i64>,
}

impl RunInput {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidFormat {
            details: e.to_string(),
        })
    }
}

/// Validated, immutable description of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub channels: Vec<String>,
    pub search_query: Option<String>,
    pub sort_mode: SortMode,
    pub time_window: TimeWindow,
    pub post_limit: u32,
    pub include_comments: bool,
    pub max_comments_per_post: u32,
}

impl RunConfig {
    pub fn from_input(input: RunInput) -> Result<Self, ConfigError> {
        let mut channels: Vec<String> = Vec::with_capacity(input.subreddits.len());
        for raw in &input.subreddits {
            let name = normalize_channel_name(raw);
            if !name.is_empty() && !channels.contains(&name) {
                channels.push(name);
            }
        }

        let search_query = input
            .search_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        if channels.is_empty() && search_query.is_none() {
            return Err(ConfigError::ValidationFailed {
                reason: "Either 'subreddits' or 'searchQuery' must be provided".to_string(),
            });
        }

        let sort_mode = match input.sort_by.as_deref() {
            None => SortMode::default(),
            Some(raw) => SortMode::parse(raw).ok_or_else(|| ConfigError::InvalidValue {
                field: "sortBy".to_string(),
                value: raw.to_string(),
            })?,
        };

        let time_window = match input.time_filter.as_deref() {
            None => TimeWindow::default(),
            Some(raw) => TimeWindow::parse(raw).ok_or_else(|| ConfigError::InvalidValue {
                field: "timeFilter".to_string(),
                value: raw.to_string(),
            })?,
        };

        let post_limit = validate_count("limit", input.limit, DEFAULT_POST_LIMIT)?;
        let max_comments_per_post = validate_count(
            "maxCommentsPerPost",
            input.max_comments_per_post,
            DEFAULT_MAX_COMMENTS,
        )?;

        Ok(Self {
            channels,
            search_query,
            sort_mode,
            time_window,
            post_limit,
            include_comments: input.include_comments,
            max_comments_per_post,
        })
    }

    /// Channels in input order, then the search query if one is set.
    pub fn work_items(&self) -> Vec<WorkItem> {
        let mut items: Vec<WorkItem> = self
            .channels
            .iter()
            .cloned()
            .map(WorkItem::Channel)
            .collect();
        if let Some(query) = &self.search_query {
            items.push(WorkItem::Search(query.clone()));
        }
        items
    }
}

fn validate_count(field: &str, value: Option<i64>, default: u32) -> Result<u32, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) if (1..=MAX_ITEMS_PER_REQUEST as i64).contains(&v) => Ok(v as u32),
        Some(v) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: format!("{} (must be between 1 and {})", v, MAX_ITEMS_PER_REQUEST),
        }),
    }
}

/// Backoff parameters for retrying failed fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 2000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetrySettings {
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Process-level settings for talking to the public API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub channel_delay_ms: u64,
    pub retry: RetrySettings,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            channel_delay_ms: 1000,
            retry: RetrySettings::default(),
        }
    }
}

impl ScraperSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::InvalidFormat {
                details: format!("{}: {}", path.display(), e),
            },
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "base_url".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "user_agent".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn channel_delay(&self) -> Duration {
        Duration::from_millis(self.channel_delay_ms)
    }
}
