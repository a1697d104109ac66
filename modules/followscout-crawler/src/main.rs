use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use followscout_common::{AccountId, Config};
use followscout_crawler::{
    CrawlOptions, Crawler, DirectoryService, MemoryCache, RateLimiter, ResultSink,
};
use twitter_client::TwitterClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("followscout_crawler=info".parse()?),
        )
        .init();

    info!("Followscout crawler starting...");

    let config = Config::from_env();
    config.log_redacted();

    let output = Path::new(&config.output_file);
    let visited = ResultSink::replay(output)?;
    info!(
        count = visited.len(),
        output = config.output_file.as_str(),
        "Rehydrated accepted identities from sink"
    );
    let sink = ResultSink::open(output)?;

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit,
        Duration::from_secs(config.rate_window_secs),
    ));
    let cache = Arc::new(MemoryCache::new());
    let client = TwitterClient::new(config.rapidapi_key.clone());
    let directory = Arc::new(DirectoryService::new(client, cache, limiter));

    let crawler = Crawler::new(
        directory,
        sink,
        visited,
        CrawlOptions {
            target_region: config.target_region.clone(),
            explore_probability: config.explore_probability,
            max_accepted: config.max_accepted,
        },
    );

    let seeds: Vec<AccountId> = config
        .seed_accounts
        .iter()
        .map(|s| AccountId::new(s))
        .collect();

    let stats = crawler.run(&seeds).await;
    info!("{stats}");

    Ok(())
}
