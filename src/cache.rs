//! Personalized page cache
//!
//! File-backed key-value store mapping a deterministic page key to the last
//! generated content for it. Keys are derived from the page slug and the
//! preference fields that shape the output, so any preference change yields
//! a fresh key and old entries simply become unreachable; only `clear()`
//! removes them.
//!
//! Persistence is best effort: a missing or corrupt cache file loads as an
//! empty cache, and a failed save keeps the in-memory entries intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::preferences::PreferenceSet;

const CACHE_DIR: &str = "tailor";
const CACHE_FILE: &str = "pages.json";

/// A cached rendering of one page under one preference set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content: String,
    /// Epoch milliseconds of the generation that produced this entry.
    pub timestamp: i64,
}

/// Derive the cache key for a page under the given preferences.
///
/// Joins the slug with the key-feeding preference fields, dropping empty
/// parts. Tags are joined with `_` in their canonical (sorted) order.
pub fn page_cache_key(slug: &str, preferences: &PreferenceSet) -> String {
    let tags = preferences
        .selected_tags
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("_");

    let parts = [
        slug,
        preferences.content.content_style.as_deref().unwrap_or(""),
        preferences.content.tone.as_deref().unwrap_or(""),
        preferences.visual.emoji_usage.as_deref().unwrap_or(""),
        preferences.visual.spacing.as_deref().unwrap_or(""),
        &tags,
        &preferences.free_text,
    ];

    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug)]
pub struct PageCache {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, CacheEntry>>,
}

impl PageCache {
    /// Open (or create) a cache backed by the given file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        PageCache {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Open the cache at its default location under the user data directory.
    pub fn at_default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| PageCache::open(dir.join(CACHE_DIR).join(CACHE_FILE)))
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Store content under a key, stamping it with the current time.
    pub fn put(&self, key: impl Into<String>, content: impl Into<String>) -> CacheEntry {
        let entry = CacheEntry {
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };

        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.into(), entry.clone());
        self.save(&entries);
        entry
    }

    /// Remove every entry. Idempotent.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
        self.save(&entries);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save(&self, entries: &BTreeMap<String, CacheEntry>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "failed to create cache directory");
                return;
            }
        }

        match serde_json::to_string(entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(error = %e, "failed to write page cache");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize page cache");
            }
        }
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, CacheEntry> {
    let Ok(contents) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };

    serde_json::from_str(&contents).unwrap_or_default()
}
