use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::Value;

use crate::cache::Cache;
use crate::config::StatsApiSettings;
use crate::errors::{fetch_context, parse_context};
use crate::http::RateLimitedClient;

/// Client of the custom-match stats API
pub struct StatsClient {
    client: RateLimitedClient,
    base_url: String,
    token: String,
}

impl StatsClient {
    pub fn new(settings: &StatsApiSettings) -> Result<Self> {
        let token = settings
            .token
            .clone()
            .context("STATS_API_TOKEN is not set")?;
        let client = RateLimitedClient::new(&settings.user_agent, settings.timeout_secs, settings.rate_limit_ms)?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            token,
        })
    }

    /// Every match the token can see, as raw JSON
    pub async fn fetch_matches_raw(&mut self) -> Result<Value> {
        let url = self.build_matches_url();
        info!("Fetching custom matches from {}", self.base_url);

        let response = self.client.get(&url).await.with_context(|| fetch_context(&self.base_url))?;

        if !response.status().is_success() {
            anyhow::bail!("Stats API returned status: {}", response.status());
        }

        let text = response.text().await?;
        serde_json::from_str(&text).with_context(|| parse_context("stats API response"))
    }

    /// One raw match object, read from the raw cache when present. Fresh
    /// responses are cached per match id. Errors come from the API only.
    pub async fn fetch_and_cache_match(&mut self, match_id: &str, cache: &Cache) -> Result<Option<Value>> {
        match cache.load_raw(match_id) {
            Ok(Some(cached)) => {
                info!("Using cached telemetry for match {}", match_id);
                return Ok(Some(cached));
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable cache entry for match {}: {:?}", match_id, e),
        }

        let response = self.fetch_matches_raw().await?;
        let Some(matches) = response.get("matches").and_then(Value::as_array) else {
            anyhow::bail!("Stats API response has no matches array");
        };

        let mut found = None;
        for raw in matches {
            let Some(mid) = raw.get("mid").and_then(Value::as_str) else {
                continue;
            };
            if let Err(e) = cache.save_raw(mid, raw) {
                warn!("Failed to save match {} to cache: {:?}", mid, e);
            }
            if mid == match_id {
                found = Some(raw.clone());
            }
        }

        Ok(found)
    }

    // --- Helper Methods ---

    fn build_matches_url(&self) -> String {
        format!("{}?token={}", self.base_url, urlencoding::encode(&self.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(token: Option<&str>) -> StatsApiSettings {
        StatsApiSettings {
            base_url: "https://stats.example.test/privatematch/".to_string(),
            token: token.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_token_is_an_error() {
        assert!(StatsClient::new(&settings(None)).is_err());
    }

    #[test]
    fn test_token_is_url_encoded() {
        let client = StatsClient::new(&settings(Some("a b&c"))).unwrap();

        assert_eq!(
            client.build_matches_url(),
            "https://stats.example.test/privatematch/?token=a%20b%26c"
        );
    }

    #[tokio::test]
    async fn test_cached_match_skips_network() {
        let dir = std::env::temp_dir().join(format!("apex_customs_stats_{}", std::process::id()));
        let cache = Cache::new(&dir).unwrap();
        cache.save_raw("m42", &serde_json::json!({ "mid": "m42" })).unwrap();
        let mut client = StatsClient::new(&settings(Some("t"))).unwrap();

        let raw = client.fetch_and_cache_match("m42", &cache).await.unwrap();

        assert_eq!(raw.unwrap()["mid"], "m42");
        std::fs::remove_dir_all(&dir).ok();
    }
}
