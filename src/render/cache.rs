//! Generational bitmap caches.
//!
//! Each entry remembers the generation (frame number) in which it was last drawn. A frame runs
//! [`BitmapCache::mark_all_unused`] before drawing, [`BitmapCache::touch`]es every key it draws,
//! and finishes with [`BitmapCache::evict_stale`]. Removed entries release their bitmap
//! immediately.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::foundation::error::MapRenderResult;
use crate::render::bitmap::Bitmap;
use crate::scene::geometry::RasterTile;

/// Symbol cache key: a hash of the symbol's appearance. Compared by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolKey(pub u64);

/// Tile cache key: compared and hashed by the identity of the tile allocation.
///
/// Holding the `Arc` keeps the allocation alive while the entry exists, so an address can not be
/// reused by a different tile that would then alias the entry.
#[derive(Clone, Debug)]
pub struct TileKey(Arc<RasterTile>);

impl TileKey {
    /// Key for `tile`.
    pub fn new(tile: &Arc<RasterTile>) -> Self {
        Self(tile.clone())
    }

    /// The keyed tile.
    pub fn tile(&self) -> &Arc<RasterTile> {
        &self.0
    }
}

impl PartialEq for TileKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TileKey {}

impl Hash for TileKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

/// A cached bitmap and the generation it was last used in.
#[derive(Debug)]
pub struct CachedBitmap {
    bitmap: Bitmap,
    generation: u64,
    seq: u64,
}

impl CachedBitmap {
    /// The cached bitmap.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Generation in which the entry was last touched.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Lifetime counters for one cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitmapCacheStats {
    /// Entries created.
    pub inserted: u64,
    /// Entries removed by [`BitmapCache::evict_stale`].
    pub evicted: u64,
    /// Bitmaps released (eviction, replacement or [`BitmapCache::dispose_all`]).
    pub disposed: u64,
}

/// Number of entries the retention policy allows: `floor(total_entries * multiplier)`.
pub fn retention_budget(total_entries: usize, multiplier: f64) -> i64 {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return 0;
    }
    (total_entries as f64 * multiplier).floor() as i64
}

/// Generation-stamped `key -> bitmap` mapping.
///
/// Key equality decides the cache's identity contract; see [`SymbolCache`] and [`TileCache`].
#[derive(Debug)]
pub struct BitmapCache<K> {
    entries: HashMap<K, CachedBitmap>,
    next_seq: u64,
    stats: BitmapCacheStats,
}

/// Symbol bitmaps keyed by appearance value.
pub type SymbolCache = BitmapCache<SymbolKey>;

/// Tile bitmaps keyed by tile identity.
pub type TileCache = BitmapCache<TileKey>;

impl<K> Default for BitmapCache<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
            stats: BitmapCacheStats::default(),
        }
    }
}

impl<K: Eq + Hash + Clone> BitmapCache<K> {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> BitmapCacheStats {
        self.stats
    }

    /// Look up an entry without changing its generation.
    pub fn lookup(&self, key: &K) -> Option<&CachedBitmap> {
        self.entries.get(key)
    }

    /// Return `true` if `key` is cached.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Stamp `key` as used in `generation`. Returns `false` if the key is not cached.
    pub fn touch(&mut self, key: &K, generation: u64) -> bool {
        match self.entries.get_mut(key) {
            Some(record) => {
                record.generation = generation;
                true
            }
            None => false,
        }
    }

    /// Insert a bitmap, taking ownership. The new entry is not yet stamped as used; callers
    /// [`touch`](Self::touch) it like any other entry they draw.
    ///
    /// Replacing an existing key releases the previous bitmap.
    pub fn insert(&mut self, key: K, bitmap: Bitmap) {
        let record = CachedBitmap {
            bitmap,
            generation: 0,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.stats.inserted += 1;
        if let Some(old) = self.entries.insert(key, record) {
            self.dispose(old);
        }
    }

    /// Lookup-or-populate: return the bitmap for `key`, creating it with `make` on a miss, and
    /// stamp the entry as used in `generation`.
    pub fn get_or_insert_with(
        &mut self,
        key: K,
        generation: u64,
        make: impl FnOnce() -> MapRenderResult<Bitmap>,
    ) -> MapRenderResult<&Bitmap> {
        let record = match self.entries.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                let bitmap = make()?;
                let seq = self.next_seq;
                self.next_seq += 1;
                self.stats.inserted += 1;
                v.insert(CachedBitmap {
                    bitmap,
                    generation: 0,
                    seq,
                })
            }
        };
        record.generation = generation;
        Ok(&record.bitmap)
    }

    /// Prepare for drawing `generation`: any entry stamped at or after it is moved back to
    /// `generation - 1`, so only entries touched during the coming draw pass carry the current
    /// generation when [`evict_stale`](Self::evict_stale) runs. Older stamps are kept, which
    /// preserves oldest-first ordering.
    pub fn mark_all_unused(&mut self, generation: u64) {
        let unused = generation.saturating_sub(1);
        for record in self.entries.values_mut() {
            if record.generation >= generation {
                record.generation = unused;
            }
        }
    }

    /// Remove the oldest entries beyond the retention budget and return how many were removed.
    ///
    /// With `used` entries stamped `generation` out of `total`, `keep = floor(total *
    /// retention_multiplier)` and `used - keep` entries are removed, oldest generation first
    /// (ties in insertion order). Nothing is removed when that difference is not positive.
    pub fn evict_stale(&mut self, generation: u64, retention_multiplier: f64) -> usize {
        let total = self.entries.len();
        let used = self
            .entries
            .values()
            .filter(|r| r.generation == generation)
            .count();
        let keep = retention_budget(total, retention_multiplier);
        let to_remove = used as i64 - keep;
        if to_remove <= 0 {
            tracing::debug!(total, used, keep, "bitmap cache within retention budget");
            return 0;
        }

        let mut order: Vec<(u64, u64, K)> = self
            .entries
            .iter()
            .map(|(k, r)| (r.generation, r.seq, k.clone()))
            .collect();
        order.sort_unstable_by_key(|(g, seq, _)| (*g, *seq));

        let to_remove = to_remove as usize;
        let mut removed = 0usize;
        for (_, _, key) in order {
            if removed >= to_remove {
                break;
            }
            if let Some(record) = self.entries.remove(&key) {
                self.dispose(record);
                removed += 1;
            }
        }
        self.stats.evicted += removed as u64;
        tracing::debug!(total, used, keep, removed, "evicted stale bitmaps");
        removed
    }

    /// Release every bitmap and clear the mapping. Returns the number of entries released.
    pub fn dispose_all(&mut self) -> usize {
        let records: Vec<CachedBitmap> = self.entries.drain().map(|(_, r)| r).collect();
        let n = records.len();
        for record in records {
            self.dispose(record);
        }
        n
    }

    fn dispose(&mut self, record: CachedBitmap) {
        drop(record.bitmap);
        self.stats.disposed += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
