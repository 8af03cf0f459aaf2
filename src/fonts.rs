//! Font loading
//!
//! Fonts are named by file path in styles, except for `DEFAULT_FONT` which
//! is compiled in. Parsed faces are kept in a small LRU keyed by path and
//! pixel size.

use crate::style::DEFAULT_FONT;
use fontdue::{Font, FontSettings};
use log::{debug, warn};
use std::collections::HashSet;

pub const FONT_CACHE_CAPACITY: usize = 16;

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Source of parsed fonts for the renderer.
pub trait FontProvider {
    /// Returns `None` when the font can't be loaded; callers skip the text.
    fn font(&mut self, family: &str, size: f32) -> Option<&Font>;
}

/// Least-recently-used map. Most recent entry is kept last.
#[derive(Debug)]
pub struct Lru<K, V> {
    entries: Vec<(K, V)>,
    capacity: usize,
}

impl<K: PartialEq, V> Lru<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(idx);
        self.entries.push(entry);
        self.entries.last().map(|(_, v)| v)
    }

    /// Inserts or replaces `key`, evicting the least recently used entry
    /// when full. Returns the evicted pair.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(idx) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(idx);
        }
        let evicted = if self.entries.len() >= self.capacity {
            Some(self.entries.remove(0))
        } else {
            None
        };
        self.entries.push((key, value));
        evicted
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FontKey {
    family: String,
    size_bits: u32,
}

pub struct FontCache {
    fonts: Lru<FontKey, Font>,
    /// Families that already failed once; they're not retried
    failed: HashSet<String>,
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new(FONT_CACHE_CAPACITY)
    }
}

impl FontCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            fonts: Lru::new(capacity),
            failed: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    fn load(family: &str, size: f32) -> Result<Font, String> {
        let settings = FontSettings {
            scale: size,
            ..FontSettings::default()
        };
        if family == DEFAULT_FONT {
            return Font::from_bytes(BUNDLED_FONT, settings).map_err(|e| e.to_string());
        }
        let bytes = std::fs::read(family).map_err(|e| e.to_string())?;
        Font::from_bytes(bytes, settings).map_err(|e| e.to_string())
    }
}

impl FontProvider for FontCache {
    fn font(&mut self, family: &str, size: f32) -> Option<&Font> {
        if self.failed.contains(family) {
            return None;
        }
        let key = FontKey {
            family: family.to_string(),
            size_bits: size.to_bits(),
        };
        if !self.fonts.contains(&key) {
            match Self::load(family, size) {
                Ok(font) => {
                    debug!("loaded font {} at {}px", family, size);
                    if let Some((old, _)) = self.fonts.put(key.clone(), font) {
                        debug!("evicted font {} at {}px", old.family, f32::from_bits(old.size_bits));
                    }
                }
                Err(e) => {
                    warn!("Failed to load font {}: {}", family, e);
                    self.failed.insert(family.to_string());
                    return None;
                }
            }
        }
        self.fonts.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_evicts_least_recently_used() {
        let mut lru = Lru::new(2);
        lru.put("a", 1);
        lru.put("b", 2);
        assert_eq!(lru.get(&"a"), Some(&1));
        assert_eq!(lru.put("c", 3), Some(("b", 2)));
        assert!(lru.contains(&"a"));
        assert!(!lru.contains(&"b"));
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn lru_replace_does_not_evict() {
        let mut lru = Lru::new(2);
        lru.put("a", 1);
        lru.put("b", 2);
        assert_eq!(lru.put("a", 10), None);
        assert_eq!(lru.get(&"a"), Some(&10));
        assert_eq!(lru.put("c", 3), Some(("b", 2)));
    }

    #[test]
    fn bundled_face_is_cached_per_size() {
        let mut cache = FontCache::default();
        assert!(cache.font(DEFAULT_FONT, 14.0).is_some());
        assert!(cache.font(DEFAULT_FONT, 14.0).is_some());
        assert_eq!(cache.len(), 1);
        assert!(cache.font(DEFAULT_FONT, 20.0).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn missing_font_is_skipped_and_remembered() {
        let mut cache = FontCache::default();
        assert!(cache.font("/nonexistent/font.ttf", 14.0).is_none());
        assert!(cache.failed.contains("/nonexistent/font.ttf"));
        assert!(cache.font("/nonexistent/font.ttf", 20.0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn garbage_font_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").expect("write");
        let mut cache = FontCache::default();
        assert!(cache.font(&path.to_string_lossy(), 14.0).is_none());
    }
}
