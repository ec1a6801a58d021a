//! Decoded image cache.
//!
//! Layouts reference the same product shot and logo across formats, so
//! decoded pixels are kept by URL to avoid re-fetching and re-decoding them
//! on every re-render.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use adcanvas_core::ImagePixels;

#[derive(Debug)]
struct CacheEntry {
    pixels: ImagePixels,
    last_accessed: Instant,
    size_bytes: usize,
}

/// Limits for the image cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum decoded bytes held.
    pub max_size_bytes: usize,
    /// Entries idle for longer than this are dropped.
    pub max_age: Duration,
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 128 * 1024 * 1024,
            max_age: Duration::from_secs(600),
            max_entries: 256,
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions.
    pub evictions: u64,
    /// Total bytes inserted.
    pub bytes_loaded: u64,
}

/// LRU cache of decoded images keyed by source URL.
#[derive(Debug)]
pub struct ImageCache {
    entries: HashMap<String, CacheEntry>,
    config: CacheConfig,
    current_size: usize,
    stats: CacheStats,
}

impl ImageCache {
    /// Create a cache with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a cache with custom limits.
    #[must_use]
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            current_size: 0,
            stats: CacheStats::default(),
        }
    }

    /// Look up an image, refreshing its access time.
    ///
    /// Expired entries are treated as misses.
    pub fn get(&mut self, url: &str) -> Option<ImagePixels> {
        let max_age = self.config.max_age;
        let expired = self
            .entries
            .get(url)
            .is_some_and(|entry| entry.last_accessed.elapsed() > max_age);
        if expired {
            self.remove_entry(url);
            self.stats.evictions += 1;
        }

        if let Some(entry) = self.entries.get_mut(url) {
            entry.last_accessed = Instant::now();
            self.stats.hits += 1;
            Some(entry.pixels.clone())
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Store an image, evicting least recently used entries to stay in bounds.
    ///
    /// An image larger than the whole byte budget is not cached.
    pub fn insert(&mut self, url: impl Into<String>, pixels: ImagePixels) {
        let url = url.into();
        let size_bytes = pixels.rgba.len();
        self.remove_entry(&url);
        if size_bytes > self.config.max_size_bytes || self.config.max_entries == 0 {
            return;
        }

        while self.current_size + size_bytes > self.config.max_size_bytes
            || self.entries.len() >= self.config.max_entries
        {
            if !self.evict_lru() {
                break;
            }
        }

        self.current_size += size_bytes;
        self.stats.bytes_loaded += size_bytes as u64;
        self.entries.insert(
            url,
            CacheEntry {
                pixels,
                last_accessed: Instant::now(),
                size_bytes,
            },
        );
    }

    /// Whether an image is cached.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_size = 0;
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decoded bytes currently held.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.current_size
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn remove_entry(&mut self, url: &str) {
        if let Some(old) = self.entries.remove(url) {
            self.current_size -= old.size_bytes;
        }
    }

    fn evict_lru(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                self.remove_entry(&key);
                self.stats.evictions += 1;
                true
            }
            None => false,
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}
