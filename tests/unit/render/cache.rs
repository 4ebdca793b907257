use super::*;
use crate::foundation::core::Rect;
use crate::foundation::error::MapRenderError;

fn bitmap() -> Bitmap {
    Bitmap::from_premul_rgba8(&[0, 0, 0, 255], 1, 1).unwrap()
}

fn tile() -> Arc<RasterTile> {
    Arc::new(RasterTile::new(
        Rect::new(0.0, 0.0, 1.0, 1.0),
        vec![1u8, 2, 3],
    ))
}

#[test]
fn symbol_keys_compare_by_value() {
    let mut cache = SymbolCache::new();
    cache.insert(SymbolKey(7), bitmap());
    assert!(cache.contains_key(&SymbolKey(7)));
    assert!(!cache.contains_key(&SymbolKey(8)));
}

#[test]
fn tile_keys_compare_by_identity() {
    let a = tile();
    let b = tile();
    assert_eq!(a.data, b.data);

    let mut cache = TileCache::new();
    cache.insert(TileKey::new(&a), bitmap());
    assert!(cache.contains_key(&TileKey::new(&a)));
    assert!(!cache.contains_key(&TileKey::new(&b)));
    assert!(cache.contains_key(&TileKey::new(&a.clone())));
    assert!(Arc::ptr_eq(TileKey::new(&a).tile(), &a));
}

#[test]
fn touch_only_hits_cached_keys() {
    let mut cache = SymbolCache::new();
    assert!(!cache.touch(&SymbolKey(1), 3));
    cache.insert(SymbolKey(1), bitmap());
    assert_eq!(cache.lookup(&SymbolKey(1)).unwrap().generation(), 0);
    assert!(cache.touch(&SymbolKey(1), 3));
    assert_eq!(cache.lookup(&SymbolKey(1)).unwrap().generation(), 3);
}

#[test]
fn get_or_insert_with_populates_once() {
    let mut cache = SymbolCache::new();
    let mut calls = 0;
    for generation in 1..=3 {
        let b = cache
            .get_or_insert_with(SymbolKey(5), generation, || {
                calls += 1;
                Ok(bitmap())
            })
            .unwrap();
        assert_eq!(b.width(), 1);
    }
    assert_eq!(calls, 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.lookup(&SymbolKey(5)).unwrap().generation(), 3);
    assert_eq!(cache.stats().inserted, 1);
}

#[test]
fn get_or_insert_with_propagates_make_errors() {
    let mut cache = SymbolCache::new();
    let err = cache
        .get_or_insert_with(SymbolKey(1), 1, || Err(MapRenderError::render("boom")))
        .unwrap_err();
    assert!(matches!(err, MapRenderError::Render(_)));
    assert!(cache.is_empty());
}

#[test]
fn mark_all_unused_demotes_current_generation_only() {
    let mut cache = SymbolCache::new();
    cache.insert(SymbolKey(1), bitmap());
    cache.insert(SymbolKey(2), bitmap());
    cache.touch(&SymbolKey(1), 2);
    cache.touch(&SymbolKey(2), 5);

    cache.mark_all_unused(5);
    assert_eq!(cache.lookup(&SymbolKey(1)).unwrap().generation(), 2);
    assert_eq!(cache.lookup(&SymbolKey(2)).unwrap().generation(), 4);

    cache.mark_all_unused(0);
    assert_eq!(cache.lookup(&SymbolKey(1)).unwrap().generation(), 0);
}

#[test]
fn retention_budget_floors_and_rejects_bad_multipliers() {
    assert_eq!(retention_budget(10, 0.25), 2);
    assert_eq!(retention_budget(1, 3.0), 3);
    assert_eq!(retention_budget(4, 0.0), 0);
    assert_eq!(retention_budget(4, f64::NAN), 0);
}

#[test]
fn single_used_entry_survives_default_multiplier() {
    let t = tile();
    let mut cache = TileCache::new();
    cache.insert(TileKey::new(&t), bitmap());
    cache.mark_all_unused(1);
    cache.touch(&TileKey::new(&t), 1);
    assert_eq!(cache.evict_stale(1, 3.0), 0);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().evicted, 0);
}

#[test]
fn eviction_removes_oldest_first_up_to_the_bound() {
    let mut cache = SymbolCache::new();
    for k in 0..6 {
        cache.insert(SymbolKey(k), bitmap());
    }
    // 0,1 stale at generation 1; 2 at generation 2; 3,4,5 used in generation 3.
    cache.touch(&SymbolKey(0), 1);
    cache.touch(&SymbolKey(1), 1);
    cache.touch(&SymbolKey(2), 2);
    for k in 3..6 {
        cache.touch(&SymbolKey(k), 3);
    }

    // total 6, used 3, keep floor(6 * 0.25) = 1, remove 2.
    let removed = cache.evict_stale(3, 0.25);
    assert_eq!(removed, 2);
    assert_eq!(cache.len(), 4);
    assert!(!cache.contains_key(&SymbolKey(0)));
    assert!(!cache.contains_key(&SymbolKey(1)));
    assert!(cache.contains_key(&SymbolKey(2)));

    let stats = cache.stats();
    assert_eq!(stats.evicted, 2);
    assert_eq!(stats.disposed, 2);
}

#[test]
fn eviction_ties_break_on_insertion_order() {
    let mut cache = SymbolCache::new();
    for k in [30, 10, 20] {
        cache.insert(SymbolKey(k), bitmap());
        cache.touch(&SymbolKey(k), 1);
    }
    // total 3, used 3, keep floor(3 * 0.5) = 1, remove 2.
    assert_eq!(cache.evict_stale(1, 0.5), 2);
    assert!(cache.contains_key(&SymbolKey(20)));
}

#[test]
fn no_eviction_when_nothing_used() {
    let mut cache = SymbolCache::new();
    cache.insert(SymbolKey(1), bitmap());
    assert_eq!(cache.evict_stale(9, 0.1), 0);
    assert_eq!(cache.len(), 1);
}

#[test]
fn replacing_a_key_disposes_the_old_bitmap() {
    let mut cache = SymbolCache::new();
    cache.insert(SymbolKey(1), bitmap());
    cache.insert(SymbolKey(1), bitmap());
    assert_eq!(cache.len(), 1);
    let stats = cache.stats();
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.disposed, 1);
}

#[test]
fn dispose_all_releases_everything() {
    let mut cache = SymbolCache::new();
    for k in 0..4 {
        cache.insert(SymbolKey(k), bitmap());
    }
    assert_eq!(cache.dispose_all(), 4);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().disposed, 4);
    assert_eq!(cache.dispose_all(), 0);
}
