use reqwest::header::{ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::Client;
use scraper_core::{
    CoreError, FetchError, RunConfig, ScraperSettings, SortMode, TimeWindow, WorkItem,
    MAX_ITEMS_PER_REQUEST,
};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    ChannelListing,
    SearchListing,
    CommentListing,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointKind::ChannelListing => "channel_listing",
            EndpointKind::SearchListing => "search_listing",
            EndpointKind::CommentListing => "comment_listing",
        };
        f.write_str(name)
    }
}

/// A single GET against one of the three public endpoint shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    ChannelListing {
        channel: String,
        sort: SortMode,
        time_window: TimeWindow,
        limit: u32,
    },
    SearchListing {
        query: String,
        sort: SortMode,
        time_window: TimeWindow,
        limit: u32,
    },
    CommentListing {
        channel: String,
        post_id: String,
        limit: u32,
    },
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_ITEMS_PER_REQUEST)
}

impl FetchRequest {
    /// Post listing for a work item, bounded by the run's post limit.
    pub fn listing(item: &WorkItem, config: &RunConfig) -> Self {
        let limit = clamp_limit(config.post_limit);
        match item {
            WorkItem::Channel(channel) => FetchRequest::ChannelListing {
                channel: channel.clone(),
                sort: config.sort_mode,
                time_window: config.time_window,
                limit,
            },
            WorkItem::Search(query) => FetchRequest::SearchListing {
                query: query.clone(),
                sort: config.sort_mode,
                time_window: config.time_window,
                limit,
            },
        }
    }

    pub fn comments(channel: &str, post_id: &str, limit: u32) -> Self {
        FetchRequest::CommentListing {
            channel: channel.to_string(),
            post_id: post_id.to_string(),
            limit: clamp_limit(limit),
        }
    }

    pub fn kind(&self) -> EndpointKind {
        match self {
            FetchRequest::ChannelListing { .. } => EndpointKind::ChannelListing,
            FetchRequest::SearchListing { .. } => EndpointKind::SearchListing,
            FetchRequest::CommentListing { .. } => EndpointKind::CommentListing,
        }
    }

    pub fn limit(&self) -> u32 {
        match self {
            FetchRequest::ChannelListing { limit, .. }
            | FetchRequest::SearchListing { limit, .. }
            | FetchRequest::CommentListing { limit, .. } => clamp_limit(*limit),
        }
    }

    pub fn build_url(&self, base: &Url) -> Result<Url, FetchError> {
        let mut url = base.clone();
        if url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl {
                url: base.to_string(),
            });
        }
        let limit = self.limit().to_string();

        match self {
            FetchRequest::ChannelListing {
                channel,
                sort,
                time_window,
                ..
            } => {
                append_path(&mut url, &["r", channel.as_str(), &format!("{}.json", sort)])?;
                let mut query = url.query_pairs_mut();
                query.clear().append_pair("limit", &limit);
                if *sort == SortMode::Top {
                    query.append_pair("t", time_window.as_str());
                }
                query.append_pair("raw_json", "1");
            }
            FetchRequest::SearchListing {
                query: search,
                sort,
                time_window,
                ..
            } => {
                append_path(&mut url, &["search.json"])?;
                let mut query = url.query_pairs_mut();
                query
                    .clear()
                    .append_pair("q", search)
                    .append_pair("limit", &limit)
                    .append_pair("sort", sort.as_str());
                if *sort == SortMode::Top {
                    query.append_pair("t", time_window.as_str());
                }
                query.append_pair("raw_json", "1");
            }
            FetchRequest::CommentListing {
                channel, post_id, ..
            } => {
                append_path(&mut url, &["r", channel.as_str(), "comments", &format!("{}.json", post_id)])?;
                url.query_pairs_mut()
                    .clear()
                    .append_pair("limit", &limit)
                    .append_pair("raw_json", "1");
            }
        }

        Ok(url)
    }
}

/// Appends below any path prefix the base already carries.
fn append_path(url: &mut Url, segments: &[&str]) -> Result<(), FetchError> {
    let base = url.to_string();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl { url: base })?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

/// Seam between the orchestrator and the network.
#[allow(async_fn_in_trait)]
pub trait ListingFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct RedditApiClient {
    http_client: Client,
    base_url: Url,
    user_agent: String,
    timeout: Duration,
}

impl RedditApiClient {
    pub fn new(settings: &ScraperSettings) -> Result<Self, CoreError> {
        let base_url = Url::parse(settings.base_url.trim()).map_err(|_| FetchError::InvalidUrl {
            url: settings.base_url.clone(),
        })?;
        let timeout = settings.request_timeout();

        let http_client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: base_url.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        info!(
            "Reddit client initialized against {} (anonymous access)",
            base_url
        );

        Ok(Self {
            http_client,
            base_url,
            user_agent: settings.user_agent.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Issues one GET and returns the parsed body untouched. Never retries.
    pub async fn get_json(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let url = request.build_url(&self.base_url)?;
        let start_time = Instant::now();

        debug!("Making Reddit API request: {} {}", request.kind(), url);
        let response = self
            .http_client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());

            warn!(
                "Reddit API returned status {} for {} {}",
                status.as_u16(),
                request.kind(),
                url
            );
            return Err(FetchError::Status {
                status_code: status.as_u16(),
                url: url.to_string(),
                retry_after,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let value: Value = serde_json::from_slice(&body).map_err(|e| FetchError::Parse {
            url: url.to_string(),
            details: e.to_string(),
        })?;

        debug!(
            "Request successful: {} {} ({} bytes in {:?})",
            status,
            url,
            body.len(),
            start_time.elapsed()
        );
        Ok(value)
    }

    fn transport_error(&self, url: &Url, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

impl ListingFetcher for RedditApiClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        self.get_json(request).await
    }
}
