// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based caching of completed analysis results
//!
//! Entries are keyed on the normalized (course, professor) identity and
//! persisted through the key-value store so results survive restarts.
//! Expired entries are deleted lazily on lookup; a cleanup sweep runs when
//! the entry count passes the cleanup threshold and evicts the oldest
//! entries down to the hard cap. The threshold (60) and cap (50) are
//! deliberately distinct: the sweep only triggers past 60 but cleans down
//! to 50.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::identity::CourseIdentity;
use crate::rating::FinalRating;
use crate::storage::{KeyValueStore, StorageError};

const STORAGE_KEY: &str = "course_result_cache";

/// One cached analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub cache_key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Identity as it looked when the result was computed
    pub identity: CourseIdentity,
    pub result: FinalRating,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
    /// Age of the oldest entry, e.g. "3 days ago"; None when empty
    pub oldest_entry: Option<String>,
    /// Age of the newest entry; None when empty
    pub newest_entry: Option<String>,
    /// Approximate serialized size of the cache in bytes
    pub approx_size_bytes: usize,
    /// Hit percentage over the lifetime of this instance, 0-100
    pub hit_rate: u32,
    pub hits: u64,
    pub misses: u64,
}

/// TTL cache for analysis results, backed by the key-value store
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a cached result for an identity.
    ///
    /// Returns None on miss or expiry; an expired entry is deleted as a side
    /// effect. Storage failures are treated as misses.
    pub async fn get(&self, identity: &CourseIdentity) -> Option<FinalRating> {
        let cache_key = identity.cache_key();
        debug!("Checking cache for: {}", cache_key);

        let mut entries = self.load().await;
        let entry = match entries.get(&cache_key) {
            Some(entry) => entry,
            None => {
                debug!("Cache miss for {}", cache_key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if entry.is_expired(Utc::now()) {
            debug!("Cache entry for {} expired, deleting", cache_key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            entries.remove(&cache_key);
            self.save(&entries).await;
            return None;
        }

        info!("Cache hit for {}", cache_key);
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.result.clone())
    }

    /// Store an analysis result under the identity's derived key.
    ///
    /// After insertion, if the entry count exceeds the cleanup threshold the
    /// cache purges expired entries and evicts oldest-first down to the cap.
    pub async fn set(
        &self,
        identity: &CourseIdentity,
        result: FinalRating,
    ) -> Result<(), StorageError> {
        let cache_key = identity.cache_key();
        debug!("Storing result for: {}", cache_key);

        let now = Utc::now();
        let entry = CacheEntry {
            cache_key: cache_key.clone(),
            created_at: now,
            expires_at: now + Duration::days(self.config.ttl_days),
            identity: identity.clone(),
            result,
        };

        let mut entries = self.load().await;
        entries.insert(cache_key, entry);

        if entries.len() > self.config.cleanup_threshold {
            info!(
                "Cleanup threshold reached ({} entries), sweeping",
                entries.len()
            );
            let now = Utc::now();
            entries.retain(|_, e| !e.is_expired(now));
            Self::evict_oldest(&mut entries, self.config.max_entries);
        }

        self.persist(&entries).await
    }

    /// Statistics over the current cache contents and this instance's
    /// hit/miss counters.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.load().await;
        let now = Utc::now();

        let total = entries.len();
        let active = entries.values().filter(|e| !e.is_expired(now)).count();

        let oldest = entries.values().map(|e| e.created_at).min();
        let newest = entries.values().map(|e| e.created_at).max();

        let approx_size_bytes = serde_json::to_string(&entries)
            .map(|s| s.len())
            .unwrap_or(0);

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let requests = hits + misses;
        let hit_rate = if requests > 0 {
            ((hits as f64 / requests as f64) * 100.0).round() as u32
        } else {
            0
        };

        CacheStats {
            total_entries: total,
            active_entries: active,
            expired_entries: total - active,
            oldest_entry: oldest.map(|t| format_age(now - t)),
            newest_entry: newest.map(|t| format_age(now - t)),
            approx_size_bytes,
            hit_rate,
            hits,
            misses,
        }
    }

    /// Remove all entries.
    pub async fn clear(&self) -> Result<(), StorageError> {
        info!("Clearing all cache entries");
        self.persist(&HashMap::new()).await
    }

    /// Remove expired entries, returning how many were removed.
    pub async fn clear_expired(&self) -> Result<usize, StorageError> {
        let mut entries = self.load().await;
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            info!("Removed {} expired cache entries", removed);
            self.persist(&entries).await?;
        }
        Ok(removed)
    }

    fn evict_oldest(entries: &mut HashMap<String, CacheEntry>, max_entries: usize) {
        if entries.len() <= max_entries {
            return;
        }

        let mut by_age: Vec<(String, DateTime<Utc>)> = entries
            .iter()
            .map(|(k, e)| (k.clone(), e.created_at))
            .collect();
        by_age.sort_by_key(|(_, created)| *created);

        let to_remove = entries.len() - max_entries;
        for (key, _) in by_age.into_iter().take(to_remove) {
            entries.remove(&key);
        }
        info!("Evicted {} oldest cache entries", to_remove);
    }

    async fn load(&self) -> HashMap<String, CacheEntry> {
        match self.store.get(STORAGE_KEY).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Cache snapshot unreadable, starting empty: {}", e);
                HashMap::new()
            }),
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!("Cache read failed, treating as empty: {}", e);
                HashMap::new()
            }
        }
    }

    async fn persist(&self, entries: &HashMap<String, CacheEntry>) -> Result<(), StorageError> {
        let value = serde_json::to_value(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(STORAGE_KEY, value).await
    }

    /// Best-effort save used on lookup paths, where a write failure must not
    /// turn a read into an error.
    async fn save(&self, entries: &HashMap<String, CacheEntry>) {
        if let Err(e) = self.persist(entries).await {
            warn!("Cache write-back failed: {}", e);
        }
    }

    #[cfg(test)]
    async fn insert_raw(&self, entry: CacheEntry) {
        let mut entries = self.load().await;
        entries.insert(entry.cache_key.clone(), entry);
        self.persist(&entries).await.unwrap();
    }
}

fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes();
    let hours = age.num_hours();
    let days = age.num_days();

    if days > 0 {
        format!("{} day{} ago", days, if days != 1 { "s" } else { "" })
    } else if hours > 0 {
        format!("{} hour{} ago", hours, if hours != 1 { "s" } else { "" })
    } else if minutes > 0 {
        format!("{} minute{} ago", minutes, if minutes != 1 { "s" } else { "" })
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::RatingSource;
    use crate::storage::MemoryStore;

    fn test_cache() -> ResultCache {
        ResultCache::new(Arc::new(MemoryStore::new()), CacheConfig {
            ttl_days: 7,
            max_entries: 50,
            cleanup_threshold: 60,
        })
    }

    fn sample_rating(overall: f64) -> FinalRating {
        FinalRating {
            overall_rating: Some(overall),
            difficulty_rating: Some(3.0),
            course_summary: "A course".to_string(),
            professor_summary: "A professor".to_string(),
            rating_source: RatingSource::ModelRubric,
            rating_source_label: "Scoring Rubric".to_string(),
            rating_source_url: None,
            sources: vec![],
            full_analysis: String::new(),
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let cache = test_cache();
        let identity = CourseIdentity::new("CS 2130").with_professor("Jane Doe");
        let rating = sample_rating(4.2);

        cache.set(&identity, rating.clone()).await.unwrap();
        let fetched = cache.get(&identity).await.unwrap();
        assert_eq!(fetched, rating);
    }

    #[tokio::test]
    async fn test_get_with_equivalent_identity() {
        let cache = test_cache();
        let stored = CourseIdentity::new("CS 2130").with_professor("Prof. Jane Doe");
        cache.set(&stored, sample_rating(4.0)).await.unwrap();

        let variant = CourseIdentity::new("cs2130").with_professor("jane doe");
        assert!(cache.get(&variant).await.is_some());
    }

    #[tokio::test]
    async fn test_miss_on_unknown_identity() {
        let cache = test_cache();
        let identity = CourseIdentity::new("PHYS 1425");
        assert!(cache.get(&identity).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_deleted_on_lookup() {
        let cache = test_cache();
        let identity = CourseIdentity::new("CS 2130").with_professor("Jane Doe");
        let now = Utc::now();

        cache
            .insert_raw(CacheEntry {
                cache_key: identity.cache_key(),
                created_at: now - Duration::days(8),
                expires_at: now - Duration::milliseconds(1),
                identity: identity.clone(),
                result: sample_rating(4.0),
            })
            .await;

        assert!(cache.get(&identity).await.is_none());
        // Lazy delete removed it from the snapshot
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_capacity_eviction_drops_oldest() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResultCache::new(store, CacheConfig {
            ttl_days: 7,
            max_entries: 50,
            cleanup_threshold: 50,
        });

        let now = Utc::now();
        // 50 entries with strictly increasing creation times
        for i in 0..50 {
            cache
                .insert_raw(CacheEntry {
                    cache_key: format!("CS{}_PROF", 1000 + i),
                    created_at: now - Duration::minutes(100 - i),
                    expires_at: now + Duration::days(7),
                    identity: CourseIdentity::new(format!("CS {}", 1000 + i)),
                    result: sample_rating(3.0),
                })
                .await;
        }

        // 51st insert through set() pushes past the threshold and evicts
        let newest = CourseIdentity::new("CS 9999").with_professor("New Prof");
        cache.set(&newest, sample_rating(5.0)).await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 50);

        // The oldest (CS1000) is the one missing; the newest survives
        assert!(cache.get(&CourseIdentity::new("CS 1000")).await.is_none());
        assert!(cache.get(&newest).await.is_some());
    }

    #[tokio::test]
    async fn test_hysteresis_no_sweep_under_threshold() {
        let cache = test_cache();
        // 55 entries: over the cap (50) but under the threshold (60),
        // so no sweep happens
        for i in 0..55 {
            let identity = CourseIdentity::new(format!("CS {}", 1000 + i));
            cache.set(&identity, sample_rating(3.0)).await.unwrap();
        }
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 55);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = test_cache();
        let identity = CourseIdentity::new("CS 2130");
        cache.set(&identity, sample_rating(4.0)).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get(&identity).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_expired_counts() {
        let cache = test_cache();
        let now = Utc::now();
        for i in 0..3 {
            cache
                .insert_raw(CacheEntry {
                    cache_key: format!("OLD{}_UNKNOWN", i),
                    created_at: now - Duration::days(10),
                    expires_at: now - Duration::days(3),
                    identity: CourseIdentity::new(format!("OLD {}", i)),
                    result: sample_rating(2.0),
                })
                .await;
        }
        cache
            .set(&CourseIdentity::new("CS 2130"), sample_rating(4.0))
            .await
            .unwrap();

        let removed = cache.clear_expired().await.unwrap();
        assert_eq!(removed, 3);
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_stats_hit_rate() {
        let cache = test_cache();
        let identity = CourseIdentity::new("CS 2130");
        cache.set(&identity, sample_rating(4.0)).await.unwrap();

        cache.get(&identity).await; // hit
        cache.get(&CourseIdentity::new("CS 9999")).await; // miss

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 50);
        assert!(stats.approx_size_bytes > 0);
        assert!(stats.newest_entry.is_some());
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(30)), "just now");
        assert_eq!(format_age(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(format_age(Duration::hours(1)), "1 hour ago");
        assert_eq!(format_age(Duration::days(3)), "3 days ago");
    }
}
