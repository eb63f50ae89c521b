use super::*;

#[test]
fn lookup_missing_returns_none() {
    let cache = DiffCache::new();
    assert_eq!(cache.lookup(5, 7, 2), None);
}

#[test]
fn store_then_lookup_at_same_or_coarser_precision() {
    let mut cache = DiffCache::new();
    cache.store(5, 7, 12.5, 2);
    assert_eq!(cache.lookup(5, 7, 2), Some(12.5));
    assert_eq!(cache.lookup(5, 7, 3), Some(12.5));
    assert_eq!(cache.lookup(5, 7, 1), None);
}

#[test]
fn store_keeps_most_accurate_precision() {
    let mut cache = DiffCache::new();
    cache.store(1, 1, 99.0, 4);
    cache.store(1, 1, 5.0, 1);
    // A later, coarser store must not clobber the finer entry.
    cache.store(1, 1, 123.0, 8);
    assert_eq!(cache.lookup(1, 1, 1), Some(5.0));
}

#[test]
fn different_coordinates_do_not_collide() {
    let mut cache = DiffCache::new();
    cache.store(1, 1, 5.0, 1);
    cache.store(2, 2, 6.0, 1);
    assert_eq!(cache.lookup(1, 1, 1), Some(5.0));
    assert_eq!(cache.lookup(2, 2, 1), Some(6.0));
}
