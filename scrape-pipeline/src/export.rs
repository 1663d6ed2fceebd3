use scraper_core::{CommentRecord, CoreError, PostRecord};
use std::fmt::Display;
use tracing::debug;

pub const POSTS_CSV_KEY: &str = "posts.csv";
pub const POSTS_WITH_COMMENTS_CSV_KEY: &str = "posts_with_comments.csv";

pub const POST_COLUMNS: [&str; 18] = [
    "id",
    "title",
    "selftext",
    "author",
    "subreddit",
    "score",
    "upvote_ratio",
    "num_comments",
    "created_utc",
    "created_at",
    "url",
    "permalink",
    "is_self",
    "is_video",
    "thumbnail",
    "domain",
    "source_type",
    "source_name",
];

const ROW_TYPE_POST: &str = "post";
const ROW_TYPE_COMMENT: &str = "comment";

const COMMENT_COLUMNS: [&str; 8] = [
    "comment_id",
    "comment_author",
    "comment_body",
    "comment_score",
    "comment_created_utc",
    "comment_created_at",
    "comment_permalink",
    "comment_is_submitter",
];

/// Outputs handed to the dataset and blob sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    pub dataset: Vec<PostRecord>,
    pub posts_csv: Vec<u8>,
    /// Present only when at least one post carries comments.
    pub posts_with_comments_csv: Option<Vec<u8>>,
}

fn export_error(e: impl Display) -> CoreError {
    CoreError::Export {
        message: e.to_string(),
    }
}

/// Post columns shared by both CSV shapes, in `POST_COLUMNS` order.
fn post_values(post: &PostRecord) -> [String; 18] {
    [
        post.id.clone(),
        post.title.clone(),
        post.selftext.clone(),
        post.author.clone(),
        post.subreddit.clone(),
        post.score.to_string(),
        post.upvote_ratio.to_string(),
        post.num_comments.to_string(),
        post.created_utc.to_string(),
        post.created_at.clone(),
        post.url.clone(),
        post.permalink.clone(),
        post.is_self.to_string(),
        post.is_video.to_string(),
        post.thumbnail.clone(),
        post.domain.clone(),
        post.source_type.to_string(),
        post.source_name.clone(),
    ]
}

fn comment_values(comment: Option<&CommentRecord>) -> Vec<String> {
    match comment {
        Some(c) => vec![
            c.id.clone(),
            c.author.clone(),
            c.body.clone(),
            c.score.to_string(),
            c.created_utc.to_string(),
            c.created_at.clone(),
            c.permalink.clone(),
            c.is_submitter.to_string(),
            c.parent_id.clone(),
        ],
        None => vec![String::new(); COMMENT_COLUMNS.len() + 1],
    }
}

/// Header of the expanded CSV: `row_type`, prefixed post columns with the
/// subreddit and source columns left unprefixed, then comment columns.
pub fn posts_with_comments_columns() -> Vec<String> {
    let mut columns = vec!["row_type".to_string()];
    for name in POST_COLUMNS {
        match name {
            "subreddit" | "source_type" | "source_name" => columns.push(name.to_string()),
            _ => columns.push(format!("post_{}", name)),
        }
    }
    columns.extend(COMMENT_COLUMNS.iter().map(|c| c.to_string()));
    columns.push("comment_parent_id".to_string());
    columns
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, CoreError> {
    writer.into_inner().map_err(|e| export_error(e.error()))
}

pub fn posts_csv(posts: &[PostRecord]) -> Result<Vec<u8>, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(POST_COLUMNS).map_err(export_error)?;
    for post in posts {
        writer.write_record(post_values(post)).map_err(export_error)?;
    }
    finish(writer)
}

/// One row per comment, or a single `post` row for a post without comments.
pub fn posts_with_comments_csv(posts: &[PostRecord]) -> Result<Vec<u8>, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(posts_with_comments_columns())
        .map_err(export_error)?;

    for post in posts {
        let post_columns = post_values(post);
        let comments = post.comments.as_deref().unwrap_or_default();

        if comments.is_empty() {
            let mut row = vec![ROW_TYPE_POST.to_string()];
            row.extend(post_columns.iter().cloned());
            row.extend(comment_values(None));
            writer.write_record(&row).map_err(export_error)?;
            continue;
        }

        for comment in comments {
            let mut row = vec![ROW_TYPE_COMMENT.to_string()];
            row.extend(post_columns.iter().cloned());
            row.extend(comment_values(Some(comment)));
            writer.write_record(&row).map_err(export_error)?;
        }
    }
    finish(writer)
}

pub fn build_exports(posts: Vec<PostRecord>) -> Result<ExportBundle, CoreError> {
    let posts_csv = posts_csv(&posts)?;

    let has_comments = posts.iter().any(|post| post.comment_count() > 0);
    let posts_with_comments_csv = if has_comments {
        Some(posts_with_comments_csv(&posts)?)
    } else {
        None
    };

    debug!(
        "Built exports for {} posts (comment rows: {})",
        posts.len(),
        has_comments
    );

    Ok(ExportBundle {
        dataset: posts,
        posts_csv,
        posts_with_comments_csv,
    })
}
