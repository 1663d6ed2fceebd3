//! Conversion of raw API "things" into the canonical record shapes.
//!
//! Normalization never fails: absent, null or mistyped fields fall back to
//! the defaults below so every record is fully populated.

use scraper_core::{
    floor_epoch_seconds, format_timestamp, normalize_channel_name, CommentRecord, PostRecord,
    SourceType,
};
use serde_json::{Map, Value};

pub const REDDIT_WEB_BASE: &str = "https://www.reddit.com";
pub const DELETED_AUTHOR: &str = "[deleted]";

const DEFAULT_STRING: &str = "";
const DEFAULT_INT: i64 = 0;
const DEFAULT_FLOAT: f64 = 0.0;
const DEFAULT_BOOL: bool = false;

/// Returns the field map inside a `{"kind": .., "data": {..}}` wrapper, or
/// the node itself when it is already unwrapped.
pub fn unwrap_thing(node: &Value) -> &Value {
    match node.get("data") {
        Some(data) if data.is_object() && node.get("kind").is_some() => data,
        _ => node,
    }
}

/// Children of a listing payload; empty for anything that is not a listing.
pub fn listing_children(listing: &Value) -> &[Value] {
    listing
        .get("data")
        .and_then(|data| data.get("children"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Typed read access over an optional field map.
struct Fields<'a>(Option<&'a Map<String, Value>>);

impl<'a> Fields<'a> {
    fn of(node: &'a Value) -> Self {
        Fields(unwrap_thing(node).as_object())
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.and_then(|map| map.get(key)).filter(|v| !v.is_null())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(value) => value
                .as_i64()
                .or_else(|| value.as_f64().map(floor_epoch_seconds))
                .unwrap_or(default),
            None => default,
        }
    }

    fn float(&self, key: &str, default: f64) -> f64 {
        self.get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    fn bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }
}

pub fn absolute_permalink(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", REDDIT_WEB_BASE, path)
    } else {
        format!("{}/{}", REDDIT_WEB_BASE, path)
    }
}

pub fn normalize_post(raw_post: &Value, source_type: SourceType, source_name: &str) -> PostRecord {
    let fields = Fields::of(raw_post);

    let fallback_subreddit = match source_type {
        SourceType::Subreddit => normalize_channel_name(source_name),
        SourceType::Search => String::new(),
    };
    let subreddit = match normalize_channel_name(&fields.string("subreddit", DEFAULT_STRING)) {
        name if name.is_empty() => fallback_subreddit,
        name => name,
    };
    let created_utc = fields.int("created_utc", DEFAULT_INT);

    PostRecord {
        id: fields.string("id", DEFAULT_STRING),
        title: fields.string("title", DEFAULT_STRING),
        selftext: fields.string("selftext", DEFAULT_STRING),
        author: fields.string("author", DELETED_AUTHOR),
        subreddit,
        score: fields.int("score", DEFAULT_INT),
        upvote_ratio: fields.float("upvote_ratio", DEFAULT_FLOAT).clamp(0.0, 1.0),
        num_comments: fields.int("num_comments", DEFAULT_INT).max(0) as u64,
        created_utc,
        created_at: format_timestamp(created_utc),
        url: fields.string("url", DEFAULT_STRING),
        permalink: absolute_permalink(&fields.string("permalink", DEFAULT_STRING)),
        is_self: fields.bool("is_self", DEFAULT_BOOL),
        is_video: fields.bool("is_video", DEFAULT_BOOL),
        thumbnail: fields.string("thumbnail", DEFAULT_STRING),
        domain: fields.string("domain", DEFAULT_STRING),
        source_type,
        source_name: source_name.to_string(),
        comments: None,
    }
}

/// `is_submitter` is decided by exact author equality with the parent post.
pub fn normalize_comment(raw_comment: &Value, post_id: &str, post_author: &str) -> CommentRecord {
    let fields = Fields::of(raw_comment);
    let author = fields.string("author", DELETED_AUTHOR);
    let created_utc = fields.int("created_utc", DEFAULT_INT);

    CommentRecord {
        is_submitter: author == post_author,
        id: fields.string("id", DEFAULT_STRING),
        author,
        body: fields.string("body", DEFAULT_STRING),
        score: fields.int("score", DEFAULT_INT),
        created_utc,
        created_at: format_timestamp(created_utc),
        permalink: absolute_permalink(&fields.string("permalink", DEFAULT_STRING)),
        parent_id: fields.string("parent_id", DEFAULT_STRING),
        post_id: post_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_post() -> Value {
        json!({
            "kind": "t3",
            "data": {
                "id": "abc123",
                "title": "Test Post",
                "selftext": "Body text",
                "author": "testuser",
                "subreddit": "test",
                "score": 100,
                "upvote_ratio": 0.95,
                "num_comments": 12,
                "created_utc": 1609459200.0,
                "url": "https://example.com/article",
                "permalink": "/r/test/comments/abc123/test_post/",
                "is_self": true,
                "is_video": false,
                "thumbnail": "self",
                "domain": "self.test"
            }
        })
    }

    #[test]
    fn test_normalizes_wrapped_post() {
        let post = normalize_post(&full_post(), SourceType::Subreddit, "test");
        assert_eq!(post.id, "abc123");
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.author, "testuser");
        assert_eq!(post.subreddit, "test");
        assert_eq!(post.score, 100);
        assert_eq!(post.upvote_ratio, 0.95);
        assert_eq!(post.num_comments, 12);
        assert_eq!(post.created_utc, 1_609_459_200);
        assert_eq!(post.created_at, "2021-01-01T00:00:00.000Z");
        assert_eq!(
            post.permalink,
            "https://www.reddit.com/r/test/comments/abc123/test_post/"
        );
        assert!(post.is_self);
        assert_eq!(post.thumbnail, "self");
        assert_eq!(post.source_type, SourceType::Subreddit);
        assert_eq!(post.source_name, "test");
        assert!(post.comments.is_none());
    }

    #[test]
    fn test_unwrapped_shape_gives_same_record() {
        let wrapped = full_post();
        let unwrapped = wrapped["data"].clone();
        assert_eq!(
            normalize_post(&wrapped, SourceType::Search, "q"),
            normalize_post(&unwrapped, SourceType::Search, "q")
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let post = normalize_post(&json!({}), SourceType::Search, "query");
        assert_eq!(post.id, "");
        assert_eq!(post.title, "");
        assert_eq!(post.selftext, "");
        assert_eq!(post.author, DELETED_AUTHOR);
        assert_eq!(post.subreddit, "");
        assert_eq!(post.score, 0);
        assert_eq!(post.upvote_ratio, 0.0);
        assert_eq!(post.num_comments, 0);
        assert_eq!(post.created_utc, 0);
        assert_eq!(post.created_at, "1970-01-01T00:00:00.000Z");
        assert_eq!(post.permalink, "");
        assert!(!post.is_self);
        assert!(!post.is_video);
        assert_eq!(post.source_type, SourceType::Search);
        assert_eq!(post.source_name, "query");
    }

    #[test]
    fn test_nulls_and_wrong_types_take_defaults() {
        let raw = json!({
            "data": {
                "title": null,
                "score": "lots",
                "upvote_ratio": null,
                "num_comments": -3,
                "is_video": "yes",
                "created_utc": "yesterday"
            },
            "kind": "t3"
        });
        let post = normalize_post(&raw, SourceType::Subreddit, "r/rust");
        assert_eq!(post.title, "");
        assert_eq!(post.score, 0);
        assert_eq!(post.num_comments, 0);
        assert!(!post.is_video);
        assert_eq!(post.created_utc, 0);
        assert_eq!(post.subreddit, "rust");
    }

    #[test]
    fn test_non_object_payload_does_not_panic() {
        let post = normalize_post(&json!("garbage"), SourceType::Subreddit, "rust");
        assert_eq!(post.id, "");
        assert_eq!(post.subreddit, "rust");
    }

    #[test]
    fn test_subreddit_prefix_stripped() {
        let raw = json!({"subreddit": "r/Programming"});
        let post = normalize_post(&raw, SourceType::Subreddit, "programming");
        assert_eq!(post.subreddit, "Programming");
    }

    #[test]
    fn test_fractional_created_utc_floored() {
        let raw = json!({"created_utc": 1640995200.75});
        let post = normalize_post(&raw, SourceType::Subreddit, "rust");
        assert_eq!(post.created_utc, 1_640_995_200);
        assert_eq!(post.created_at, "2022-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_comment_submitter_is_exact_match() {
        let raw = json!({"kind": "t1", "data": {"id": "c1", "author": "OP", "body": "hi"}});
        assert!(normalize_comment(&raw, "p1", "OP").is_submitter);
        assert!(!normalize_comment(&raw, "p1", "op").is_submitter);
        assert!(!normalize_comment(&raw, "p1", "someone").is_submitter);
    }

    #[test]
    fn test_comment_fields() {
        let raw = json!({
            "kind": "t1",
            "data": {
                "id": "def456",
                "author": "commenter",
                "body": "Great post!",
                "score": 25,
                "created_utc": 1609459260,
                "permalink": "/r/test/comments/abc123/test_post/def456/",
                "parent_id": "t3_abc123",
                "is_submitter": true
            }
        });
        let comment = normalize_comment(&raw, "abc123", "testuser");
        assert_eq!(comment.id, "def456");
        assert_eq!(comment.body, "Great post!");
        assert_eq!(comment.score, 25);
        assert_eq!(comment.created_at, "2021-01-01T00:01:00.000Z");
        assert_eq!(comment.parent_id, "t3_abc123");
        assert_eq!(comment.post_id, "abc123");
        // native flag is ignored in favour of author comparison
        assert!(!comment.is_submitter);
    }

    #[test]
    fn test_absolute_permalink_passthrough() {
        assert_eq!(
            absolute_permalink("https://www.reddit.com/r/x/"),
            "https://www.reddit.com/r/x/"
        );
        assert_eq!(absolute_permalink("r/x/"), "https://www.reddit.com/r/x/");
        assert_eq!(absolute_permalink(""), "");
    }

    #[test]
    fn test_listing_children() {
        let listing = json!({"kind": "Listing", "data": {"children": [{"kind": "t3"}, {"kind": "t3"}]}});
        assert_eq!(listing_children(&listing).len(), 2);
        assert!(listing_children(&json!("")).is_empty());
        assert!(listing_children(&json!({"data": {}})).is_empty());
    }
}
