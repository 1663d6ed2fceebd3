pub mod export;
pub mod orchestrator;
pub mod sink;

pub use export::{build_exports, ExportBundle, POSTS_CSV_KEY, POSTS_WITH_COMMENTS_CSV_KEY};
pub use orchestrator::Scraper;
pub use sink::DirectorySink;
