use crate::scoring::ScoringMode;
use crate::scoring::rule_set::ALGS_PLACEMENT_POINTS;

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "apex_customs.db".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsApiSettings {
    pub base_url: String,
    /// Access token of the custom-match stats API, sent as `?token=`
    pub token: Option<String>,
    pub rate_limit_ms: u64,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub cache_dir: String,
}

impl Default for StatsApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://r5-crossplay.r5prod.stryder.respawn.com/privatematch/".to_string(),
            token: None,
            rate_limit_ms: 500, // 2 req/sec
            user_agent: "ApexCustoms/1.0".to_string(),
            timeout_secs: 30,
            cache_dir: "cache".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OverlaySettings {
    pub refresh_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            refresh_ms: 1000,
            timeout_secs: 5,
            user_agent: "ApexCustomsOverlay/1.0".to_string(),
        }
    }
}

/// Rule set used when a new custom does not spell one out
#[derive(Debug, Clone)]
pub struct ScoringSettings {
    pub default_mode: ScoringMode,
    pub default_placement_points: Vec<u32>,
    pub default_kill_point_rate: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            default_mode: ScoringMode::Algs,
            default_placement_points: ALGS_PLACEMENT_POINTS.to_vec(),
            default_kill_point_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub stats_api: StatsApiSettings,
    pub overlay: OverlaySettings,
    pub scoring: ScoringSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Tests pass a map
    /// instead of touching the real environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(path) = lookup("DATABASE_PATH") {
            config.database.path = path;
        }
        if let Some(url) = lookup("STATS_API_URL") {
            config.stats_api.base_url = url;
        }
        if let Some(token) = lookup("STATS_API_TOKEN").filter(|t| !t.is_empty()) {
            config.stats_api.token = Some(token);
        }
        if let Some(dir) = lookup("STATS_CACHE_DIR") {
            config.stats_api.cache_dir = dir;
        }

        config
    }
}
