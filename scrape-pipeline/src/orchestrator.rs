use reddit_client::{
    extract_comments, listing_children, normalize_post, FetchRequest, ListingFetcher, RetryConfig,
    RetryExecutor,
};
use scraper_core::{
    now_timestamp, CommentRecord, ErrorExt, FetchError, PostRecord, RunConfig, RunResult,
    RunStats, ScraperSettings, WorkItem,
};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Sequential fetch-normalize-aggregate driver.
///
/// Work items are processed one at a time with a fixed pause between two
/// channels; comment trees are fetched one post at a time.
#[derive(Debug)]
pub struct Scraper<F> {
    fetcher: F,
    retry: RetryExecutor,
    channel_delay: Duration,
}

impl<F: ListingFetcher> Scraper<F> {
    pub fn new(fetcher: F, retry: RetryConfig, channel_delay: Duration) -> Self {
        Self {
            fetcher,
            retry: RetryExecutor::new(retry),
            channel_delay,
        }
    }

    pub fn from_settings(fetcher: F, settings: &ScraperSettings) -> Self {
        Self::new(
            fetcher,
            RetryConfig::from(&settings.retry),
            settings.channel_delay(),
        )
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs every work item in order. Item and post failures are logged and
    /// absorbed, so this always produces a result.
    pub async fn run(&self, config: &RunConfig) -> RunResult {
        let items = config.work_items();
        info!(
            "Starting scrape of {} work item(s): {} channel(s), search query: {}",
            items.len(),
            config.channels.len(),
            config.search_query.as_deref().unwrap_or("none")
        );

        let mut posts: Vec<PostRecord> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut failed_items = 0usize;

        let mut previous: Option<&WorkItem> = None;
        for item in &items {
            // pacing applies between consecutive channels only
            let between_channels = matches!(previous, Some(WorkItem::Channel(_)))
                && matches!(item, WorkItem::Channel(_));
            if between_channels && !self.channel_delay.is_zero() {
                debug!("Pausing {:?} before {}", self.channel_delay, item);
                sleep(self.channel_delay).await;
            }
            previous = Some(item);

            match self.scrape_item(item, config, &mut seen_ids).await {
                Ok(item_posts) => {
                    info!("Fetched {} posts from {}", item_posts.len(), item);
                    posts.extend(item_posts);
                }
                Err(e) => {
                    failed_items += 1;
                    e.log_error();
                    error!("Skipping {}: post listing could not be fetched", item);
                }
            }
        }

        if !items.is_empty() && failed_items == items.len() {
            warn!("Every work item failed; the run produced no posts");
        } else if posts.is_empty() {
            warn!("No posts were scraped. Check your input parameters.");
        }

        let retry_metrics = self.retry.get_metrics();
        info!(
            "Scrape finished: {} posts, {} of {} work item(s) failed, {} retries",
            posts.len(),
            failed_items,
            items.len(),
            retry_metrics.total_retries
        );

        RunResult {
            stats: RunStats {
                total_posts: posts.len(),
                channels_scraped: config.channels.len(),
                search_query: config.search_query.clone(),
                timestamp: now_timestamp(),
            },
            posts,
        }
    }

    async fn scrape_item(
        &self,
        item: &WorkItem,
        config: &RunConfig,
        seen_ids: &mut HashSet<String>,
    ) -> Result<Vec<PostRecord>, FetchError> {
        let request = FetchRequest::listing(item, config);
        let listing = self.fetch_with_retry(&request, &item.to_string()).await?;

        let children = listing_children(&listing);
        if children.len() > config.post_limit as usize {
            debug!(
                "{} returned {} posts, keeping the first {}",
                item,
                children.len(),
                config.post_limit
            );
        }

        let mut posts = Vec::with_capacity(children.len().min(config.post_limit as usize));
        for child in children.iter().take(config.post_limit as usize) {
            let mut post = normalize_post(child, item.source_type(), item.name());

            if post.id.is_empty() {
                warn!("Skipping a post from {}: listing entry has no id", item);
                continue;
            }
            if !seen_ids.insert(post.id.clone()) {
                debug!("Skipping post {} from {}: already collected", post.id, item);
                continue;
            }

            if config.include_comments {
                post.comments = Some(self.fetch_comments(&post, config).await);
            }
            posts.push(post);
        }

        Ok(posts)
    }

    /// Comment tree for one post; any failure degrades to an empty sequence.
    async fn fetch_comments(&self, post: &PostRecord, config: &RunConfig) -> Vec<CommentRecord> {
        if post.num_comments == 0 {
            return Vec::new();
        }
        if post.id.is_empty() || post.subreddit.is_empty() {
            warn!("Cannot fetch comments for a post without id or subreddit");
            return Vec::new();
        }

        let request =
            FetchRequest::comments(&post.subreddit, &post.id, config.max_comments_per_post);
        let label = format!("comments for post {}", post.id);

        match self.fetch_with_retry(&request, &label).await {
            Ok(response) => extract_comments(
                &response,
                &post.id,
                &post.author,
                config.max_comments_per_post as usize,
            ),
            Err(e) => {
                warn!(
                    "Failed to fetch comments for post {} ({}): {}",
                    post.id,
                    e.error_code(),
                    e
                );
                Vec::new()
            }
        }
    }

    async fn fetch_with_retry(
        &self,
        request: &FetchRequest,
        label: &str,
    ) -> Result<Value, FetchError> {
        let fetcher = &self.fetcher;
        self.retry
            .execute(label, move || fetcher.fetch(request))
            .await
    }
}
