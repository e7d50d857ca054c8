use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{Event, parse_event};
use crate::errors::cache_context;

/// File-based match corpus store with two tiers.
///
/// `raw/` holds payloads exactly as delivered by the competition data
/// client, `parsed/` holds typed [`Event`]s ready for the engine.
pub struct Cache {
    cache_dir: PathBuf,
    raw_dir: PathBuf,
    parsed_dir: PathBuf,
}

impl Cache {
    /// Open the cache at `cache_dir`, creating both tier directories
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        let raw_dir = cache_dir.join("raw");
        let parsed_dir = cache_dir.join("parsed");

        fs::create_dir_all(&raw_dir).context("Failed to create raw cache directory")?;
        fs::create_dir_all(&parsed_dir).context("Failed to create parsed cache directory")?;

        Ok(Self {
            cache_dir,
            raw_dir,
            parsed_dir,
        })
    }

    /// Typed event for `key`, parsing (and storing) the raw payload if
    /// no parsed copy exists yet.
    pub fn load_event(&self, key: &str) -> Result<Event> {
        if let Some(event) = self.load_parsed(key)? {
            return Ok(event);
        }

        let raw = self
            .load_raw(key)?
            .ok_or_else(|| anyhow::anyhow!("No cached data for event '{}'", key))?;
        let event = parse_event(&raw).with_context(|| format!("Failed to parse raw payload for '{}'", key))?;

        info!("Parsed event {} with {} matches", key, event.matches.len());
        self.save_parsed(key, &event)?;
        Ok(event)
    }

    /// Store a raw payload and drop any stale parsed copy of it.
    pub fn import_raw(&self, key: &str, data: &Value) -> Result<()> {
        self.save_raw(key, data)?;

        let parsed = self.build_parsed_path(key);
        if parsed.exists() {
            fs::remove_file(&parsed).with_context(|| cache_context("invalidate", key))?;
        }
        Ok(())
    }

    /// Write an untyped payload to the raw tier
    pub fn save_raw(&self, key: &str, data: &Value) -> Result<()> {
        let file_path = self.build_raw_path(key);
        self.write_json(&file_path, data)
            .with_context(|| cache_context("write raw", key))?;
        info!("Saved raw data to cache: {}", file_path.display());
        Ok(())
    }

    /// Raw payload for `key`, if one has been stored
    pub fn load_raw(&self, key: &str) -> Result<Option<Value>> {
        let file_path = self.build_raw_path(key);
        self.read_json_opt(&file_path)
    }

    /// Write a typed value to the parsed tier
    pub fn save_parsed<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_parsed_path(key);
        self.write_json(&file_path, data)
            .with_context(|| cache_context("write parsed", key))?;
        info!("Saved parsed data to cache: {}", file_path.display());
        Ok(())
    }

    /// Typed value for `key` from the parsed tier, if present
    pub fn load_parsed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        let file_path = self.build_parsed_path(key);
        self.read_json_opt(&file_path)
    }

    /// Whether either tier holds data for `key`
    pub fn exists(&self, key: &str) -> bool {
        self.build_raw_path(key).exists() || self.build_parsed_path(key).exists()
    }

    /// Remove every cached file and recreate the empty tiers
    pub fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.cache_dir).context("Failed to clear cache")?;

        fs::create_dir_all(&self.raw_dir).context("Failed to recreate raw cache directory")?;
        fs::create_dir_all(&self.parsed_dir).context("Failed to recreate parsed cache directory")?;

        info!("Cleared cache directory");
        Ok(())
    }

    fn build_raw_path(&self, key: &str) -> PathBuf {
        self.raw_dir.join(format!("{}.json", key))
    }

    fn build_parsed_path(&self, key: &str) -> PathBuf {
        self.parsed_dir.join(format!("{}.json", key))
    }

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(path, json).context("Failed to write cache file")?;
        Ok(())
    }

    fn read_json_opt<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }
}
