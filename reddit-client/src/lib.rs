pub mod api;
pub mod comments;
pub mod normalize;
pub mod retry;

#[cfg(test)]
mod tests;

pub use api::{EndpointKind, FetchRequest, ListingFetcher, RedditApiClient};
pub use comments::{comment_listing, extract_comments, is_tombstoned};
pub use normalize::{listing_children, normalize_comment, normalize_post, unwrap_thing};
pub use retry::{RetryConfig, RetryExecutor, RetryMetrics, RetryStrategy};
