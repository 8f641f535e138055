use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

use crate::models::{Job, JobsFeed, SearchConfig};

pub const DEFAULT_BASE_URL: &str = "https://fuchsgeier.de";

const CONFIG_PATH: &str = "config.json";
const JOBS_PATH: &str = "jobs.json";

/// Client for the two static feed resources. One attempt per call, no
/// retries; callers decide how to surface failure.
pub struct FeedClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl FeedClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn load_config(&self) -> Result<SearchConfig> {
        self.get_json(CONFIG_PATH)
    }

    pub fn load_jobs(&self) -> Result<Vec<Job>> {
        let feed: JobsFeed = self.get_json(JOBS_PATH)?;
        Ok(feed.jobs)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header("Cache-Control", "no-cache")
            .send()
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("GET {} returned {}", url, response.status()));
        }

        response
            .json()
            .with_context(|| format!("Invalid JSON from {}", url))
    }
}
