use std::env;

use tracing::info;

/// Run parameters loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// RapidAPI key for both directory endpoints.
    pub rapidapi_key: String,
    /// Seed account handles the crawl starts from.
    pub seed_accounts: Vec<String>,
    /// Target "account based in" value accepted into the sink.
    pub target_region: String,
    /// Path of the append-only JSONL result sink.
    pub output_file: String,
    /// Outbound requests allowed per rate window.
    pub rate_limit: u32,
    /// Rate window length in seconds.
    pub rate_window_secs: u64,
    /// Probability of re-sampling a candidate already in the frontier.
    pub explore_probability: f64,
    /// Stop after this many accepted records. 0 = unbounded.
    pub max_accepted: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            rapidapi_key: required_env("RAPIDAPI_KEY"),
            seed_accounts: required_env("SEED_ACCOUNTS")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            target_region: env::var("TARGET_REGION").unwrap_or_else(|_| "China".to_string()),
            output_file: env::var("OUTPUT_FILE").unwrap_or_else(|_| "accounts.jsonl".to_string()),
            rate_limit: parse_env("RATE_LIMIT", 60),
            rate_window_secs: parse_env("RATE_WINDOW_SECS", 60),
            explore_probability: parse_env("EXPLORE_PROBABILITY", 0.2),
            max_accepted: parse_env("MAX_ACCEPTED", 0),
        }
    }

    /// Log the effective configuration without leaking the API key.
    pub fn log_redacted(&self) {
        info!(
            seeds = self.seed_accounts.len(),
            target_region = self.target_region.as_str(),
            output_file = self.output_file.as_str(),
            rate_limit = self.rate_limit,
            rate_window_secs = self.rate_window_secs,
            explore_probability = self.explore_probability,
            max_accepted = self.max_accepted,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got {raw:?}")),
        Err(_) => default,
    }
}
