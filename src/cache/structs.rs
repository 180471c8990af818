use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// File cache of raw stats API match objects, one JSON file per match id
pub struct Cache {
    raw_dir: PathBuf,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let raw_dir = cache_dir.as_ref().join("raw");

        fs::create_dir_all(&raw_dir).context("Failed to create raw cache directory")?;

        Ok(Self { raw_dir })
    }

    /// Save raw API response to cache
    pub fn save_raw(&self, id: &str, data: &Value) -> Result<()> {
        let file_path = self.build_raw_path(id);
        self.write_json(&file_path, data)?;
        debug!("Saved raw data to cache: {}", file_path.display());
        Ok(())
    }

    /// Load raw API response from cache
    pub fn load_raw(&self, id: &str) -> Result<Option<Value>> {
        let file_path = self.build_raw_path(id);
        self.read_json_opt(&file_path)
    }

    // --- Helper Methods ---

    /// Match ids come from a remote API; keep them from escaping the cache dir
    fn build_raw_path(&self, id: &str) -> PathBuf {
        let safe: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.raw_dir.join(format!("{}.json", safe))
    }

    fn write_json(&self, path: &Path, data: &Value) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(path, json).context("Failed to write cache file")?;
        Ok(())
    }

    fn read_json_opt(&self, path: &Path) -> Result<Option<Value>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                &json[..json.len().min(200)]
            )
        })?;
        Ok(Some(data))
    }
}
