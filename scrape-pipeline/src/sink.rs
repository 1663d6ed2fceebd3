use crate::export::{ExportBundle, POSTS_CSV_KEY, POSTS_WITH_COMMENTS_CSV_KEY};
use scraper_core::{CoreError, RunStats};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DATASET_KEY: &str = "dataset.json";
pub const SUMMARY_KEY: &str = "summary.json";

/// Writes the dataset, run statistics and CSV blobs into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the paths written, in write order.
    pub fn write(&self, stats: &RunStats, exports: &ExportBundle) -> Result<Vec<PathBuf>, CoreError> {
        fs::create_dir_all(&self.root)?;
        let mut written = Vec::with_capacity(4);

        let dataset = serde_json::to_vec_pretty(&exports.dataset)?;
        written.push(self.put(DATASET_KEY, &dataset)?);

        let summary = serde_json::to_vec_pretty(stats)?;
        written.push(self.put(SUMMARY_KEY, &summary)?);

        written.push(self.put(POSTS_CSV_KEY, &exports.posts_csv)?);
        if let Some(combined) = &exports.posts_with_comments_csv {
            written.push(self.put(POSTS_WITH_COMMENTS_CSV_KEY, combined)?);
        }

        info!(
            "Saved {} posts and {} export file(s) to {}",
            exports.dataset.len(),
            written.len(),
            self.root.display()
        );
        Ok(written)
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<PathBuf, CoreError> {
        let path = self.root.join(key);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}
