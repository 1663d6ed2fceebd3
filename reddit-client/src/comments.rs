use crate::normalize::{listing_children, normalize_comment, unwrap_thing};
use scraper_core::CommentRecord;
use serde_json::Value;
use tracing::debug;

/// Author/body values the API substitutes for deleted or removed content.
pub const TOMBSTONE_SENTINELS: &[&str] = &["[deleted]", "[removed]", "[ Removed by Reddit ]"];

const COMMENT_KIND: &str = "t1";

/// The comment listing inside a comment-tree response.
///
/// The endpoint answers with `[post_listing, comment_listing]`; a bare
/// listing is accepted as well.
pub fn comment_listing(response: &Value) -> Option<&Value> {
    match response {
        Value::Array(parts) => parts.get(1),
        Value::Object(_) if response.get("data").is_some() => Some(response),
        _ => None,
    }
}

/// A missing author counts as deleted, the same as a missing body.
pub fn is_tombstoned(data: &Value) -> bool {
    let author = data.get("author").and_then(Value::as_str);
    let body = data.get("body").and_then(Value::as_str);

    match (author, body) {
        (None, _) | (_, None) => true,
        (_, Some(body)) if body.trim().is_empty() => true,
        (Some(author), Some(body)) => {
            TOMBSTONE_SENTINELS.contains(&author) || TOMBSTONE_SENTINELS.contains(&body)
        }
    }
}

struct Walk<'a> {
    post_id: &'a str,
    post_author: &'a str,
    max_count: usize,
    out: Vec<CommentRecord>,
    skipped: usize,
}

impl Walk<'_> {
    fn is_full(&self) -> bool {
        self.out.len() >= self.max_count
    }

    /// Pre-order: a node is emitted before its replies, siblings in API order.
    fn visit_listing(&mut self, listing: &Value) {
        for child in listing_children(listing) {
            if self.is_full() {
                return;
            }
            self.visit_node(child);
        }
    }

    fn visit_node(&mut self, node: &Value) {
        if node.get("kind").and_then(Value::as_str) != Some(COMMENT_KIND) {
            // "more" stubs and anything else carry no inline replies
            return;
        }
        let data = unwrap_thing(node);

        if is_tombstoned(data) {
            self.skipped += 1;
        } else {
            self.out
                .push(normalize_comment(node, self.post_id, self.post_author));
        }

        if let Some(replies) = data.get("replies").filter(|r| r.is_object()) {
            self.visit_listing(replies);
        }
    }
}

/// Flattens a comment-tree response into at most `max_count` records.
pub fn extract_comments(
    response: &Value,
    post_id: &str,
    post_author: &str,
    max_count: usize,
) -> Vec<CommentRecord> {
    let mut walk = Walk {
        post_id,
        post_author,
        max_count,
        out: Vec::with_capacity(max_count.min(64)),
        skipped: 0,
    };

    if let Some(listing) = comment_listing(response) {
        if max_count > 0 {
            walk.visit_listing(listing);
        }
    }

    debug!(
        "Extracted {} comments for post {} ({} tombstoned skipped)",
        walk.out.len(),
        post_id,
        walk.skipped
    );
    walk.out
}
