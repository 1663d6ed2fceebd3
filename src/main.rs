use anyhow::Context;
use reddit_client::RedditApiClient;
use scrape_pipeline::{build_exports, DirectorySink, Scraper};
use scraper_core::{ErrorExt, RunConfig, RunInput, ScraperSettings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_INPUT: &str = "input.json";
const DEFAULT_OUTPUT_DIR: &str = "storage";
const SETTINGS_ENV: &str = "SCRAPER_SETTINGS";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("reddit_scraper=info,scrape_pipeline=info,reddit_client=info")
            }),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let input_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_INPUT.to_string()));
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()));

    let settings = match std::env::var_os(SETTINGS_ENV) {
        Some(path) => ScraperSettings::load(&PathBuf::from(path))
            .map_err(|e| anyhow::anyhow!(e.log_error().user_friendly_message()))?,
        None => ScraperSettings::default(),
    };

    let raw_input = std::fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read input file {}", input_path.display()))?;
    let config = RunInput::from_json_str(&raw_input)
        .and_then(RunConfig::from_input)
        .map_err(|e| {
            anyhow::anyhow!(
                "Input validation failed: {}",
                e.log_error().user_friendly_message()
            )
        })?;

    tracing::info!(
        "Starting Reddit scraper: {} channel(s), search query: {}, sort: {}, limit: {}, comments: {}",
        config.channels.len(),
        config.search_query.as_deref().unwrap_or("none"),
        config.sort_mode,
        config.post_limit,
        config.include_comments
    );

    let client = RedditApiClient::new(&settings)?;
    let scraper = Scraper::from_settings(client, &settings);
    let result = scraper.run(&config).await;

    let stats = result.stats;
    let exports = build_exports(result.posts)?;
    DirectorySink::new(&output_dir).write(&stats, &exports)?;

    tracing::info!(
        "Successfully scraped and saved {} Reddit posts",
        stats.total_posts
    );
    Ok(())
}
