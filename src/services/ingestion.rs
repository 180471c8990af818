use anyhow::Context;
use log::info;

use crate::api::StatsClient;
use crate::cache::Cache;
use crate::config::AppConfig;
use crate::database::{self, DbPool, SqliteStore};
use crate::errors::{ScoringError, ScoringResult};
use crate::scoring::{CustomId, RecordedMatch};
use crate::services::scoring::ScoringService;

/// Pulls one match from the stats API and records it for a custom
pub struct IngestionService {
    cache: Cache,
    api_client: StatsClient,
    pool: DbPool,
    config: AppConfig,
}

impl IngestionService {
    /// A missing token is a configuration error; an unusable cache directory
    /// is a storage error.
    pub fn new(pool: DbPool, config: AppConfig) -> ScoringResult<Self> {
        let api_client =
            StatsClient::new(&config.stats_api).map_err(|e| ScoringError::configuration(format!("{:#}", e)))?;
        let cache = Cache::new(&config.stats_api.cache_dir)
            .with_context(|| format!("Failed to prepare stats cache in {}", config.stats_api.cache_dir))
            .map_err(ScoringError::Storage)?;

        Ok(Self {
            cache,
            api_client,
            pool,
            config,
        })
    }

    pub async fn run(&mut self, custom_id: CustomId, match_id: &str) -> ScoringResult<RecordedMatch> {
        info!("=== Ingesting match {} into custom {} ===", match_id, custom_id);

        // Step 1: Fetch raw telemetry (cache first)
        let raw = self
            .api_client
            .fetch_and_cache_match(match_id, &self.cache)
            .await
            .map_err(ScoringError::Upstream)?
            .ok_or_else(|| ScoringError::not_found(format!("match {} in stats API", match_id)))?;

        // Step 2: Score and persist
        let mut conn = database::get_connection(&self.pool).map_err(ScoringError::Storage)?;
        let mut service = ScoringService::new(SqliteStore::new(&mut conn), self.config.scoring.clone());
        let recorded = service.record_match(custom_id, None, raw, None)?;

        info!("=== Ingestion Complete: stored as match {} ===", recorded.match_id);
        Ok(recorded)
    }
}
