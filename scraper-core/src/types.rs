use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound the public API applies to every listing request.
pub const MAX_ITEMS_PER_REQUEST: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Subreddit,
    Search,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Subreddit => "subreddit",
            SourceType::Search => "search",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub created_utc: i64,
    pub created_at: String,
    pub url: String,
    pub permalink: String,
    pub is_self: bool,
    pub is_video: bool,
    pub thumbnail: String,
    pub domain: String,
    pub source_type: SourceType,
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentRecord>>,
}

impl PostRecord {
    pub fn comment_count(&self) -> usize {
        self.comments.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: i64,
    pub created_at: String,
    pub permalink: String,
    pub is_submitter: bool,
    pub parent_id: String,
    pub post_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    New,
    Hot,
    Top,
    Rising,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [SortMode::New, SortMode::Hot, SortMode::Top, SortMode::Rising];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::New => "new",
            SortMode::Hot => "hot",
            SortMode::Top => "top",
            SortMode::Rising => "rising",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
    All,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 6] = [
        TimeWindow::Hour,
        TimeWindow::Day,
        TimeWindow::Week,
        TimeWindow::Month,
        TimeWindow::Year,
        TimeWindow::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Hour => "hour",
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|window| window.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    Channel(String),
    Search(String),
}

impl WorkItem {
    pub fn source_type(&self) -> SourceType {
        match self {
            WorkItem::Channel(_) => SourceType::Subreddit,
            WorkItem::Search(_) => SourceType::Search,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WorkItem::Channel(name) | WorkItem::Search(name) => name,
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkItem::Channel(name) => write!(f, "r/{}", name),
            WorkItem::Search(query) => write!(f, "search '{}'", query),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_posts: usize,
    pub channels_scraped: usize,
    pub search_query: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub posts: Vec<PostRecord>,
    pub stats: RunStats,
}
